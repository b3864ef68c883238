// Library exports for binary tools and tests
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::realtime::AdminBroadcast;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Used for login rate limiting only; connections are opened on demand.
    pub redis_client: redis::Client,
    pub config: Arc<Config>,
    pub admin_broadcast: AdminBroadcast,
}
