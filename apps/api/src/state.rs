use std::sync::Arc;

use crate::config::Config;
use crate::db::Database;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence handle, connected once at startup.
    pub db: Arc<Database>,
    pub config: Config,
}
