use std::sync::Arc;

use modiste_provider::ImageProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: modiste_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Image generation backend.
    pub provider: Arc<dyn ImageProvider>,
}
