//! Registration, login, and the current-account endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password, CurrentUser};
use crate::error::ApiError;
use crate::state::AppState;
use vendo_core::validation::validate_email;
use vendo_core::{Role, User};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// Public view of a user. `password_hash` never leaves the server.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            company_name: user.company_name,
            phone: user.phone,
            address: user.address,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/v1/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate_email(&req.email)?;

    if req.password.is_empty() {
        return Err(ApiError::Validation("password must not be empty".into()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        password_hash: hash_password(&req.password)?,
        full_name: req.full_name,
        role: req.role,
        company_name: req.company_name,
        phone: req.phone,
        address: req.address,
        is_active: true,
        created_at: Utc::now(),
    };

    // Duplicate email surfaces as 409 through the repository.
    let stored = state.db.users().insert(&user).await?;

    info!(user_id = %stored.id, role = %stored.role, "User registered");

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// `POST /api/v1/auth/login`
///
/// Credential failures are deliberately indistinguishable: unknown email
/// and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(&req.email)
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or_else(|| ApiError::Unauthenticated("Incorrect email or password".into()))?;

    if !user.is_active {
        return Err(ApiError::BadRequest("Inactive user".into()));
    }

    let access_token = state.jwt.generate_token(&user)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// `GET /api/v1/auth/me`
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
