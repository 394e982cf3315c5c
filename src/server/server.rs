use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::HeaderValue,
    middleware,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::error::ApiError;
use crate::render::Renderer;

use super::loop_routes::loop_routes;
use super::render_routes::render_routes;
use super::state::*;
use super::upload_routes::upload_routes;
use super::{log_requests, ServerConfig};

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
    environment: String,
    uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "Hello": "World" }))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Service is healthy",
    })
}

async fn get_status(State(state): State<ServerState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

async fn db_health_check(
    State(store): State<GuardedLoopStore>,
) -> Result<Json<serde_json::Value>, ApiError> {
    store.health_check().map_err(ApiError::storage)?;
    Ok(Json(serde_json::json!({ "db": "ok" })))
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

pub fn make_app(
    config: ServerConfig,
    loop_store: GuardedLoopStore,
    file_store: GuardedFileStore,
) -> Router {
    let renderer = Arc::new(Renderer::new(loop_store.clone(), file_store.clone()));
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        loop_store,
        file_store,
        renderer,
    };

    let api_routes: Router<ServerState> = Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/db-health", get(db_health_check))
        .route("/status", get(get_status))
        .merge(loop_routes())
        .merge(upload_routes())
        .merge(render_routes());

    let mut app: Router = Router::new()
        .nest("/api/v1", api_routes.with_state(state.clone()))
        .layer(build_cors_layer(&config.allowed_origins));

    // Local file store: serve the media directory statically so stored URLs
    // resolve over HTTP as well
    if let Some(media_path) = &config.serve_media_path {
        app = app
            .nest_service("/uploads", ServeDir::new(media_path.join("uploads")))
            .nest_service("/renders", ServeDir::new(media_path.join("renders")));
    }

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    config: ServerConfig,
    loop_store: GuardedLoopStore,
    file_store: GuardedFileStore,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, loop_store, file_store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    info!("Ready to serve at port {}!", port);
    Ok(axum::serve(listener, app).await?)
}
