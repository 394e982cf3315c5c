//! Byte storage for uploaded loops and rendered variations.
//!
//! Two interchangeable backends behind one trait: a local media directory
//! (served statically by the HTTP layer) and an S3-compatible object store.
//! The backend is picked once at startup from configuration.

mod local;
mod object;
mod sign;

pub use local::LocalFileStore;
pub use object::ObjectFileStore;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::config::StorageSettings;

#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage for raw audio bytes, addressed by a logical key like
/// `uploads/abc.wav` or `renders/loop5-commercial-1a2b3c4d.wav`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persist bytes under `key` and return the public URL they will be
    /// reachable at.
    async fn store(
        &self,
        data: Vec<u8>,
        key: &str,
        content_type: &str,
    ) -> Result<String, FileStoreError>;

    /// Turn a URL previously returned by [`store`](Self::store) back into a
    /// locally readable file path. The object backend fetches the object to
    /// a temporary file first.
    async fn resolve(&self, url: &str) -> Result<PathBuf, FileStoreError>;

    /// Remove the bytes stored under `key`.
    async fn delete(&self, key: &str) -> Result<(), FileStoreError>;
}

/// Build the configured backend. Object-store settings were already
/// validated during config resolution, so this cannot half-construct.
pub fn build_file_store(
    storage: &StorageSettings,
    media_path: &std::path::Path,
) -> Arc<dyn FileStore> {
    match storage {
        StorageSettings::Local => Arc::new(LocalFileStore::new(media_path.to_path_buf())),
        StorageSettings::Object(settings) => Arc::new(ObjectFileStore::new(settings.clone())),
    }
}
