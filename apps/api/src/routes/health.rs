use axum::Json;
use serde_json::{json, Value};

/// GET /
/// Service banner pointing at the export dashboard.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Welcome to EmoGo Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "export_page": "/export"
    }))
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
