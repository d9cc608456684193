//! API error types and their HTTP mapping.
//!
//! Every failure a handler can produce funnels into [`ApiError`], which
//! renders as a JSON body `{"detail": "..."}` with the matching status code.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────┬────────┐
//! │ Error                        │ Status │
//! ├──────────────────────────────┼────────┤
//! │ NotFound                     │  404   │
//! │ Conflict (dup / re-confirm)  │  409   │
//! │ BadRequest (stock, inactive) │  400   │
//! │ Validation                   │  422   │
//! │ Forbidden                    │  403   │
//! │ Unauthenticated              │  401   │
//! │ Internal                     │  500   │
//! └──────────────────────────────┴────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use vendo_core::{CoreError, ValidationError};
use vendo_db::DbError;

/// Error type for API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity doesn't exist.
    #[error("{0}")]
    NotFound(String),

    /// Duplicate key or a state transition that already happened.
    #[error("{0}")]
    Conflict(String),

    /// Request is well-formed but cannot be satisfied.
    #[error("{0}")]
    BadRequest(String),

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// Caller is authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invalid credentials.
    #[error("{0}")]
    Unauthenticated(String),

    /// Anything we don't want to show the caller.
    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref detail) = self {
            // Full detail goes to the log, not to the caller.
            error!(detail = %detail, "Internal error");
        }

        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_)
            | CoreError::OrderNotFound(_)
            | CoreError::UserNotFound(_) => ApiError::NotFound(err.to_string()),
            CoreError::InsufficientStock { .. } => ApiError::BadRequest(err.to_string()),
            CoreError::AlreadyConfirmed { .. } => ApiError::Conflict(err.to_string()),
            CoreError::Forbidden { .. } | CoreError::NotOwner { .. } => {
                ApiError::Forbidden(err.to_string())
            }
            CoreError::Validation(v) => ApiError::from(v),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::Domain(core) => ApiError::from(core),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::NotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Unauthenticated("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_errors_map_through() {
        let err: ApiError = CoreError::ProductNotFound("p1".into()).into();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err: ApiError = CoreError::InsufficientStock {
            product: "Widget".into(),
            available: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = CoreError::AlreadyConfirmed {
            order_id: "o1".into(),
            current_status: "confirmed".into(),
        }
        .into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_internal_detail_is_not_exposed() {
        let err = ApiError::Internal("connection string leaked".into());
        assert_eq!(err.to_string(), "Internal server error");
    }
}
