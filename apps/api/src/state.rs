//! Shared application state.

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use vendo_db::Database;

/// State handed to every handler via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = JwtManager::new(config.jwt_secret.clone(), config.jwt_lifetime_secs);
        AppState { db, jwt, config }
    }
}
