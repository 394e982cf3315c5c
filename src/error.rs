//! Error taxonomy for the public API surface.
//!
//! Every failure crossing a handler boundary is classified into one of these
//! kinds; library-level errors (rusqlite, symphonia, hound, reqwest) are
//! wrapped with a kind and a preserved diagnostic message, never returned
//! verbatim.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Malformed or disallowed input.
    #[error("{0}")]
    Validation(String),

    /// Operation requires state not yet present (e.g. rendering a loop that
    /// has no audio).
    #[error("{0}")]
    PreconditionFailed(String),

    /// Referenced audio file cannot be read (missing, corrupt, unsupported
    /// codec).
    #[error("{0}")]
    ResourceUnavailable(String),

    /// Repository or file-store operation failed.
    #[error("{0}")]
    Storage(String),

    /// Audio decode/effect/encode step failed; aborts the whole render.
    #[error("{0}")]
    Transformation(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    detail: String,
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Validation(_) => "validation_error",
            ApiError::PreconditionFailed(_) => "precondition_failed",
            ApiError::ResourceUnavailable(_) => "resource_unavailable",
            ApiError::Storage(_) => "storage_failure",
            ApiError::Transformation(_) => "transformation_failure",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::PreconditionFailed(_) => StatusCode::CONFLICT,
            ApiError::ResourceUnavailable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Transformation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.kind(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Storage(format!("{:#}", err))
    }
}
