pub mod extract;
pub mod health;

use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tracing::info;

use crate::export::handlers as export;
use crate::resources::handlers::{handle_create, handle_get, handle_list};
use crate::resources::{GpsCoordinate, Sentiment, Vlog};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Resource API
        .route(
            "/api/vlogs",
            get(handle_list::<Vlog>).post(handle_create::<Vlog>),
        )
        .route("/api/vlogs/:id", get(handle_get::<Vlog>))
        .route(
            "/api/sentiments",
            get(handle_list::<Sentiment>).post(handle_create::<Sentiment>),
        )
        .route("/api/sentiments/:id", get(handle_get::<Sentiment>))
        .route(
            "/api/gps",
            get(handle_list::<GpsCoordinate>).post(handle_create::<GpsCoordinate>),
        )
        .route("/api/gps/:id", get(handle_get::<GpsCoordinate>))
        // Export
        .route("/export", get(export::handle_dashboard))
        .route("/export/vlogs", get(export::handle_export::<Vlog>))
        .route("/export/sentiments", get(export::handle_export::<Sentiment>))
        .route("/export/gps", get(export::handle_export::<GpsCoordinate>))
        .route("/export/all", get(export::handle_export_all));

    if let Some(dir) = &state.config.media_dir {
        info!("Serving media files from {}", dir.display());
        router = router.nest_service("/media", ServeDir::new(dir));
    }

    router.with_state(state)
}
