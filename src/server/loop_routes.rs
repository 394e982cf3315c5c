//! Loop CRUD routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::debug;

use crate::error::ApiError;
use crate::loop_store::{Loop, LoopPatch, NewLoop};

use super::state::{GuardedLoopStore, ServerState};

async fn create_loop(
    State(store): State<GuardedLoopStore>,
    Json(body): Json<NewLoop>,
) -> Result<(StatusCode, Json<Loop>), ApiError> {
    if body.name.trim().is_empty() {
        return Err(ApiError::Validation("Loop name must not be empty".to_string()));
    }
    let created = store.create(body).map_err(ApiError::storage)?;
    debug!("Created loop {} ({:?})", created.id, created.name);
    Ok((StatusCode::CREATED, Json(created)))
}

async fn list_loops(State(store): State<GuardedLoopStore>) -> Result<Json<Vec<Loop>>, ApiError> {
    let loops = store.list().map_err(ApiError::storage)?;
    Ok(Json(loops))
}

async fn get_loop(
    State(store): State<GuardedLoopStore>,
    Path(id): Path<i64>,
) -> Result<Json<Loop>, ApiError> {
    store
        .get(id)
        .map_err(ApiError::storage)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Loop {} not found", id)))
}

async fn update_loop(
    State(store): State<GuardedLoopStore>,
    Path(id): Path<i64>,
    Json(patch): Json<LoopPatch>,
) -> Result<Json<Loop>, ApiError> {
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(ApiError::Validation("Loop name must not be empty".to_string()));
        }
    }
    store
        .update(id, patch)
        .map_err(ApiError::storage)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Loop {} not found", id)))
}

async fn delete_loop(
    State(store): State<GuardedLoopStore>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if store.delete(id).map_err(ApiError::storage)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Loop {} not found", id)))
    }
}

pub fn loop_routes() -> Router<ServerState> {
    Router::new()
        .route("/loops", get(list_loops).post(create_loop))
        .route(
            "/loops/{id}",
            get(get_loop).patch(update_loop).delete(delete_loop),
        )
}
