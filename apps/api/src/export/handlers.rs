use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::{self, ALL_DATA_FILENAME};
use crate::resources::Resource;
use crate::state::AppState;

fn attachment<T: Serialize>(filename: &str, body: T) -> Response {
    (
        [(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename={filename}"),
        )],
        Json(body),
    )
        .into_response()
}

/// GET /export
pub async fn handle_dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let store = state.db.get().await?;
    let counts = export::count_collections(store.as_ref()).await?;
    Ok(Html(export::render_dashboard(&counts)))
}

/// GET /export/{vlogs,sentiments,gps}
pub async fn handle_export<R: Resource>(
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let store = state.db.get().await?;
    let records = export::export_collection::<R>(store.as_ref()).await?;
    info!("Exported {} documents from {}", records.len(), R::COLLECTION);
    Ok(attachment(&export::filename(R::COLLECTION), records))
}

/// GET /export/all
pub async fn handle_export_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let store = state.db.get().await?;
    let all = export::export_all(store.as_ref()).await?;
    info!(
        "Exported all collections ({} vlogs, {} sentiments, {} GPS coordinates)",
        all.vlogs.len(),
        all.sentiments.len(),
        all.gps_coordinates.len()
    );
    Ok(attachment(ALL_DATA_FILENAME, all))
}
