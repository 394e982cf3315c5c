//! Render and arrangement-planning routes. The two are independently
//! callable; rendering never consumes an arrangement plan.

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::ApiError;
use crate::render::{
    plan_arrangement, ArrangementConfig, ArrangementPlan, RenderConfig, VariationResult,
};

use super::state::{GuardedRenderer, ServerState};

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub loop_id: i64,
    pub variations: Vec<VariationResult>,
}

async fn render_loop(
    State(renderer): State<GuardedRenderer>,
    Path(id): Path<i64>,
    Json(config): Json<RenderConfig>,
) -> Result<Json<RenderResponse>, ApiError> {
    let variations = renderer.render(id, &config).await?;
    Ok(Json(RenderResponse {
        loop_id: id,
        variations,
    }))
}

async fn plan(Json(config): Json<ArrangementConfig>) -> Result<Json<ArrangementPlan>, ApiError> {
    if !(config.length_seconds > 0.0) {
        return Err(ApiError::Validation(
            "length_seconds must be greater than zero".to_string(),
        ));
    }
    Ok(Json(plan_arrangement(&config)))
}

pub fn render_routes() -> Router<ServerState> {
    Router::new()
        .route("/loops/{id}/render", post(render_loop))
        .route("/arrangement", post(plan))
}
