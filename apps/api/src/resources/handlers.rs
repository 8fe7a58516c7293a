use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::resources::{service, ListParams, Record, Resource};
use crate::routes::extract::{AppJson, AppQuery};
use crate::state::AppState;

/// POST /api/{vlogs,sentiments,gps}
pub async fn handle_create<R: Resource>(
    State(state): State<AppState>,
    AppJson(input): AppJson<R::Create>,
) -> Result<(StatusCode, Json<Record<R>>), AppError> {
    let store = state.db.get().await?;
    let record = service::create::<R>(store.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/{vlogs,sentiments,gps}?skip=&limit=
pub async fn handle_list<R: Resource>(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ListParams>,
) -> Result<Json<Vec<Record<R>>>, AppError> {
    let options = params.find_options()?;
    let store = state.db.get().await?;
    Ok(Json(service::list::<R>(store.as_ref(), options).await?))
}

/// GET /api/{vlogs,sentiments,gps}/:id
/// The id is checked before the store is looked up, so a malformed id is a
/// 400 whether or not the database is connected.
pub async fn handle_get<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record<R>>, AppError> {
    let id = service::parse_id::<R>(state.db.codec(), &id)?;
    let store = state.db.get().await?;
    Ok(Json(service::find::<R>(store.as_ref(), &id).await?))
}
