//! S3-compatible object store backend (Cloudflare R2, MinIO, AWS S3).
//!
//! The client is constructed once at startup from validated settings and
//! owned by the store; requests are signed per call with SigV4.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::sign::sign_request;
use super::{FileStore, FileStoreError};
use crate::config::ObjectStoreSettings;

const REQUEST_TIMEOUT_SECS: u64 = 120;

pub struct ObjectFileStore {
    client: reqwest::Client,
    settings: ObjectStoreSettings,
    host: String,
}

impl ObjectFileStore {
    pub fn new(settings: ObjectStoreSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");

        let host = settings
            .endpoint
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            settings,
            host,
        }
    }

    fn object_path(&self, key: &str) -> String {
        format!("/{}/{}", self.settings.bucket, key.trim_start_matches('/'))
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}{}",
            self.settings.endpoint.trim_end_matches('/'),
            self.object_path(key)
        )
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.settings.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    /// Recover the logical key from a public URL produced by
    /// [`public_url`](Self::public_url).
    fn key_for_url(&self, url: &str) -> Result<String, FileStoreError> {
        let base = self.settings.public_base_url.trim_end_matches('/');
        url.strip_prefix(base)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                FileStoreError::Backend(format!(
                    "URL {:?} is not under the configured public base URL",
                    url
                ))
            })
    }

    async fn send_signed(
        &self,
        method: reqwest::Method,
        key: &str,
        body: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<reqwest::Response, FileStoreError> {
        let path = self.object_path(key);
        let signed = sign_request(
            method.as_str(),
            &self.host,
            &path,
            &body,
            &self.settings.access_key,
            &self.settings.secret_key,
            Utc::now(),
        );

        let mut request = self
            .client
            .request(method, self.object_url(key))
            .header("authorization", signed.authorization)
            .header("x-amz-date", signed.amz_date)
            .header("x-amz-content-sha256", signed.amz_content_sha256);
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        if !body.is_empty() {
            request = request.body(body);
        }

        request
            .send()
            .await
            .map_err(|e| FileStoreError::Backend(format!("Object store request failed: {}", e)))
    }
}

#[async_trait]
impl FileStore for ObjectFileStore {
    async fn store(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, FileStoreError> {
        let response = self
            .send_signed(reqwest::Method::PUT, key, data, Some(content_type))
            .await?;

        if !response.status().is_success() {
            return Err(FileStoreError::Backend(format!(
                "Object store PUT {} failed with status {}",
                key,
                response.status()
            )));
        }

        debug!("Stored {} in bucket {}", key, self.settings.bucket);
        Ok(self.public_url(key))
    }

    async fn resolve(&self, url: &str) -> Result<PathBuf, FileStoreError> {
        let key = self.key_for_url(url)?;
        let response = self
            .send_signed(reqwest::Method::GET, &key, Vec::new(), None)
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FileStoreError::NotFound(url.to_string()));
        }
        if !response.status().is_success() {
            return Err(FileStoreError::Backend(format!(
                "Object store GET {} failed with status {}",
                key,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FileStoreError::Backend(format!("Object store read failed: {}", e)))?;

        // Keep the extension so downstream decoding can use it as a format
        // hint. The temp file is deliberately persisted for the lifetime of
        // the render request; the OS temp dir reclaims it.
        let suffix = std::path::Path::new(&key)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let temp = tempfile::Builder::new()
            .prefix("loop-audio-")
            .suffix(&suffix)
            .tempfile()?;
        let (file, temp_path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);
        file.write_all(&bytes).await?;
        file.flush().await?;

        Ok(temp_path.keep().map_err(|e| {
            FileStoreError::Backend(format!("Failed to persist temp file: {}", e))
        })?)
    }

    async fn delete(&self, key: &str) -> Result<(), FileStoreError> {
        let response = self
            .send_signed(reqwest::Method::DELETE, key, Vec::new(), None)
            .await?;

        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(FileStoreError::Backend(format!(
                "Object store DELETE {} failed with status {}",
                key,
                response.status()
            )));
        }
        Ok(())
    }
}
