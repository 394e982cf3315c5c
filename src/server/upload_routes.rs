//! Audio file upload route.
//!
//! Validation is against the declared content type only; there is no content
//! sniffing gate. This is trust-the-client validation, not a security
//! boundary. A mismatch between declared type and sniffed bytes is logged
//! for operators but does not reject the upload.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;

use super::state::{GuardedFileStore, ServerState};

/// 64 MB upload ceiling, comfortably above any realistic loop sample.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub content_type: String,
}

/// File extension for an allowed declared content type.
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        _ => None,
    }
}

async fn upload_file(
    State(file_store): State<GuardedFileStore>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .ok_or_else(|| {
                ApiError::Validation("File field must declare a content type".to_string())
            })?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read file data: {}", e)))?;
        upload = Some((content_type, data.to_vec()));
    }

    let (content_type, data) =
        upload.ok_or_else(|| ApiError::Validation("No file field provided".to_string()))?;
    if data.is_empty() {
        return Err(ApiError::Validation("Uploaded file is empty".to_string()));
    }

    let extension = extension_for(&content_type).ok_or_else(|| {
        ApiError::Validation(format!(
            "Unsupported content type {:?}; only wav and mp3 uploads are accepted",
            content_type
        ))
    })?;

    if let Some(kind) = infer::get(&data) {
        if kind.mime_type() != content_type {
            warn!(
                "Upload declared {:?} but bytes look like {:?}",
                content_type,
                kind.mime_type()
            );
        }
    }

    let key = format!("uploads/{}.{}", Uuid::new_v4().simple(), extension);
    let url = file_store
        .store(data, &key, &content_type)
        .await
        .map_err(ApiError::storage)?;

    info!("Uploaded {} as {}", content_type, url);
    Ok(Json(UploadResponse { url, content_type }))
}

pub fn upload_routes() -> Router<ServerState> {
    Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
