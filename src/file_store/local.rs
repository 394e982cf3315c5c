//! Local filesystem backend: files live under the media directory and are
//! served statically by the HTTP layer under the same relative paths.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::{FileStore, FileStoreError};

pub struct LocalFileStore {
    media_path: PathBuf,
}

impl LocalFileStore {
    pub fn new(media_path: PathBuf) -> Self {
        Self { media_path }
    }

    /// Map a `/uploads/...`-style URL back to a path inside the media
    /// directory, rejecting anything that would escape it.
    fn path_for_url(&self, url: &str) -> Result<PathBuf, FileStoreError> {
        let relative = url.trim_start_matches('/');
        let relative_path = Path::new(relative);
        if relative.is_empty()
            || relative_path
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(FileStoreError::Backend(format!(
                "Refusing to resolve URL {:?} outside the media directory",
                url
            )));
        }
        Ok(self.media_path.join(relative_path))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn store(
        &self,
        data: Vec<u8>,
        key: &str,
        _content_type: &str,
    ) -> Result<String, FileStoreError> {
        let path = self.path_for_url(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, data).await?;
        debug!("Stored {} at {:?}", key, path);
        Ok(format!("/{}", key))
    }

    async fn resolve(&self, url: &str) -> Result<PathBuf, FileStoreError> {
        let path = self.path_for_url(url)?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(FileStoreError::NotFound(url.to_string()));
        }
        Ok(path)
    }

    async fn delete(&self, key: &str) -> Result<(), FileStoreError> {
        let path = self.path_for_url(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(FileStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
