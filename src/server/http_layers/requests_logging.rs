//! Request logging middleware
#![allow(dead_code)] // Used as middleware

use axum::extract::State;
use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::IntoResponse,
};
use std::time::Instant;
use tracing::{debug, info};

use super::super::state::ServerState;

#[derive(PartialEq, PartialOrd, Clone, Debug, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    Path,
    Headers,
}

impl Default for RequestsLoggingLevel {
    fn default() -> Self {
        Self::Path
    }
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();

    let start = Instant::now();
    let method = request.method().to_string();
    let uri = request.uri().to_string();

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, uri);
    }
    if level >= RequestsLoggingLevel::Headers {
        for (name, value) in request.headers() {
            debug!("    {}: {:?}", name, value);
        }
    }

    let response = next.run(request).await;

    if level > RequestsLoggingLevel::None {
        info!(
            "<<< {} {} -> {} ({}ms)",
            method,
            uri,
            response.status(),
            start.elapsed().as_millis()
        );
    }
    response
}
