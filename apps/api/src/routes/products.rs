//! Product catalog endpoints.
//!
//! ## Rules
//! - Every mutation is manufacturer-only and ownership-checked.
//! - Existence before ownership: a missing product is 404 even for a
//!   caller who would have been 403 on a present one.
//! - `sku` and `barcode` are immutable after creation; the update payload
//!   cannot carry them.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::routes::Pagination;
use crate::state::AppState;
use vendo_core::policy::{authorize, ensure_owner};
use vendo_core::validation::{
    validate_barcode, validate_cost_cents, validate_price_cents, validate_product_name,
    validate_sku, validate_stock_level,
};
use vendo_core::{Action, Product, ProductPatch, Role};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub sku: String,
    pub barcode: String,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub min_quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/v1/products` - manufacturers see their own catalog, everyone
/// else sees all products.
pub async fn list_products(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Product>>, ApiError> {
    authorize(user.role, Action::ListProducts)?;

    let products = match user.role {
        Role::Manufacturer => {
            state
                .db
                .products()
                .list_by_manufacturer(&user.id, page.skip, page.limit)
                .await?
        }
        _ => state.db.products().list(page.skip, page.limit).await?,
    };

    Ok(Json(products))
}

/// `POST /api/v1/products`
pub async fn create_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    authorize(user.role, Action::CreateProduct)?;

    validate_product_name(&req.name)?;
    validate_sku(&req.sku)?;
    validate_barcode(&req.barcode)?;
    validate_price_cents(req.price_cents)?;
    validate_cost_cents(req.cost_cents)?;
    validate_stock_level("quantity", req.quantity)?;
    validate_stock_level("min_quantity", req.min_quantity)?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        manufacturer_id: user.id.clone(),
        name: req.name,
        description: req.description,
        sku: req.sku,
        barcode: req.barcode,
        price_cents: req.price_cents,
        cost_cents: req.cost_cents,
        quantity: req.quantity,
        min_quantity: req.min_quantity,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let stored = state.db.products().insert(&product).await?;

    info!(product_id = %stored.id, sku = %stored.sku, "Product created");

    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /api/v1/products/low-stock` - products at or below their reorder
/// threshold, scoped to the calling manufacturer.
pub async fn low_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Product>>, ApiError> {
    authorize(user.role, Action::ListLowStock)?;

    let products = state
        .db
        .products()
        .list_low_stock(&user.id, page.skip, page.limit)
        .await?;

    Ok(Json(products))
}

/// `GET /api/v1/products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    authorize(user.role, Action::ReadProduct)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    Ok(Json(product))
}

/// `PUT /api/v1/products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, ApiError> {
    authorize(user.role, Action::UpdateProduct)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    ensure_owner(&product.manufacturer_id, &user.id, "Product", &id)?;

    if let Some(ref name) = patch.name {
        validate_product_name(name)?;
    }
    if let Some(price) = patch.price_cents {
        validate_price_cents(price)?;
    }
    validate_cost_cents(patch.cost_cents)?;
    if let Some(qty) = patch.quantity {
        validate_stock_level("quantity", qty)?;
    }
    if let Some(min) = patch.min_quantity {
        validate_stock_level("min_quantity", min)?;
    }

    let updated = state.db.products().update(&id, &patch).await?;

    info!(product_id = %id, "Product updated");

    Ok(Json(updated))
}

/// `DELETE /api/v1/products/{id}` - hard delete. Existing order lines keep
/// their snapshot; the line is skipped if the order is confirmed later.
pub async fn delete_product(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(user.role, Action::DeleteProduct)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    ensure_owner(&product.manufacturer_id, &user.id, "Product", &id)?;

    state.db.products().remove(&id).await?;

    info!(product_id = %id, "Product deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/v1/products/{id}/stock` - atomic relative stock adjustment.
/// A negative delta may drive stock below zero.
pub async fn adjust_stock(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<Product>, ApiError> {
    authorize(user.role, Action::AdjustStock)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    ensure_owner(&product.manufacturer_id, &user.id, "Product", &id)?;

    state.db.products().adjust_stock(&id, req.delta).await?;

    let updated = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".into()))?;

    info!(product_id = %id, delta = req.delta, quantity = updated.quantity, "Stock adjusted");

    Ok(Json(updated))
}
