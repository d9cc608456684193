//! HTTP route table.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Route Map (/api/v1)                            │
//! │                                                                         │
//! │  POST /auth/register        open      create account                    │
//! │  POST /auth/login           open      issue JWT                         │
//! │  GET  /auth/me              bearer    current account                   │
//! │                                                                         │
//! │  GET    /products           bearer    manufacturer → own, others → all  │
//! │  POST   /products           bearer    manufacturer only                 │
//! │  GET    /products/low-stock bearer    manufacturer only, own catalog    │
//! │  GET    /products/{id}      bearer    any role                          │
//! │  PUT    /products/{id}      bearer    owning manufacturer               │
//! │  DELETE /products/{id}      bearer    owning manufacturer               │
//! │  POST   /products/{id}/stock bearer   owning manufacturer, delta adjust │
//! │                                                                         │
//! │  GET  /orders               bearer    store → own, manufacturer →       │
//! │                                       pending, admin → all              │
//! │  POST /orders               bearer    store only, atomic stock check    │
//! │  GET  /orders/{id}          bearer    store limited to own orders       │
//! │  PUT  /orders/{id}/status   bearer    manufacturer; confirm deducts     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod orders;
pub mod products;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::error::ApiError;
use crate::state::AppState;
use vendo_core::DEFAULT_PAGE_LIMIT;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/low-stock", get(products::low_stock))
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/{id}/stock", post(products::adjust_stock))
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/status", put(orders::update_order_status))
}

// =============================================================================
// Service Endpoints
// =============================================================================

/// Service banner.
async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "service": "vendo-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Liveness check: verifies the database answers.
async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.health_check().await {
        return Err(ApiError::Internal("database unreachable".to_string()));
    }

    Ok(Json(json!({ "status": "ok" })))
}

// =============================================================================
// Pagination
// =============================================================================

/// Offset/limit pagination query parameters (`?skip=0&limit=100`).
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            skip: 0,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}
