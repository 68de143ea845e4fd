//! Shared state handed to every axum handler.

use crate::config::JwtConfig;
use crate::db::AsyncDbPool;
use crate::services::Services;

/// Cloning is cheap: services and the pool are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Used directly by the health checks
    pub db_pool: AsyncDbPool,
    /// Secret for validating bearer tokens in the auth middleware
    pub jwt_config: JwtConfig,
}

impl AppState {
    pub fn new(db_pool: AsyncDbPool, services: Services, jwt_config: JwtConfig) -> Self {
        Self {
            services,
            db_pool,
            jwt_config,
        }
    }
}
