//! Order workflow endpoints.
//!
//! ## Rules
//! - Only stores place orders; creation is a single stock-checked
//!   transaction that persists the order and all lines or nothing.
//! - Listing is role-scoped: a store sees its own orders, a manufacturer
//!   works the pending queue, an admin sees everything.
//! - Setting status to `confirmed` routes through the transactional
//!   confirm path and deducts stock exactly once; every other status is
//!   a plain overwrite.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::routes::Pagination;
use crate::state::AppState;
use vendo_core::policy::{authorize, ensure_owner};
use vendo_core::validation::{validate_order_items, validate_shipping_address};
use vendo_core::{Action, NewOrderItem, Order, OrderItem, OrderStatus, Role};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: String,
    pub notes: Option<String>,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// An order together with its line items.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/v1/orders` - role-scoped listing.
pub async fn list_orders(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Order>>, ApiError> {
    authorize(user.role, Action::ListOrders)?;

    let orders = match user.role {
        Role::Store => {
            state
                .db
                .orders()
                .list_by_store(&user.id, page.skip, page.limit)
                .await?
        }
        Role::Manufacturer => {
            state
                .db
                .orders()
                .list_by_status(OrderStatus::Pending, page.skip, page.limit)
                .await?
        }
        Role::Admin => state.db.orders().list_all(page.skip, page.limit).await?,
    };

    Ok(Json(orders))
}

/// `POST /api/v1/orders`
pub async fn create_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    authorize(user.role, Action::CreateOrder)?;

    validate_shipping_address(&req.shipping_address)?;
    validate_order_items(&req.items)?;

    let (order, items) = state
        .db
        .orders()
        .create_with_items(&user.id, &req.shipping_address, req.notes, &req.items)
        .await?;

    info!(
        order_number = %order.order_number,
        store_id = %user.id,
        items = items.len(),
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(OrderResponse { order, items })))
}

/// `GET /api/v1/orders/{id}` - stores may only read their own orders.
pub async fn get_order(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    authorize(user.role, Action::ReadOrder)?;

    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;

    if user.role == Role::Store {
        ensure_owner(&order.store_id, &user.id, "Order", &id)?;
    }

    let items = state.db.orders().get_items(&id).await?;

    Ok(Json(OrderResponse { order, items }))
}

/// `PUT /api/v1/orders/{id}/status`
pub async fn update_order_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    authorize(user.role, Action::UpdateOrderStatus)?;

    // 404 before anything else.
    state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".into()))?;

    let order = match req.status {
        OrderStatus::Confirmed => state.db.orders().confirm(&id).await?,
        status => state.db.orders().set_status(&id, status).await?,
    };

    info!(order_id = %id, status = %order.status, "Order status updated");

    Ok(Json(order))
}
