mod file_config;

pub use file_config::{FileConfig, ObjectStoreConfig};

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that participate in config resolution. Mirrors the subset
/// of CLI flags that a TOML config file may override.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub media_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

/// Which file-store backend the deployment uses.
#[derive(Debug, Clone)]
pub enum StorageSettings {
    Local,
    Object(ObjectStoreSettings),
}

/// Fully validated object-store settings. Constructed only when the object
/// backend is selected; missing settings are a startup error, never a silent
/// no-op at request time.
#[derive(Debug, Clone)]
pub struct ObjectStoreSettings {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub media_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub environment: String,
    pub allowed_origins: Vec<String>,
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("database path must be specified on the CLI or in the config file")
            })?;

        // Media (uploads + renders) defaults to the database's directory
        let media_path = file
            .media_path
            .map(PathBuf::from)
            .or_else(|| cli.media_path.clone())
            .or_else(|| db_path.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| RequestsLoggingLevel::from_str(&s, true).ok())
            .unwrap_or_else(|| cli.logging_level.clone());

        let environment = file.environment.unwrap_or_else(|| "production".to_string());

        let allowed_origins = file.allowed_origins.unwrap_or_else(|| vec!["*".to_string()]);

        let storage = match file.storage_backend.as_deref().unwrap_or("local") {
            "local" => StorageSettings::Local,
            "object" => {
                let object = file.object_store.unwrap_or_default();
                StorageSettings::Object(ObjectStoreSettings {
                    endpoint: require(object.endpoint, "object_store.endpoint")?,
                    access_key: require(object.access_key, "object_store.access_key")?,
                    secret_key: require(object.secret_key, "object_store.secret_key")?,
                    bucket: require(object.bucket, "object_store.bucket")?,
                    public_base_url: require(
                        object.public_base_url,
                        "object_store.public_base_url",
                    )?,
                })
            }
            other => bail!(
                "Unknown storage_backend {:?}, expected \"local\" or \"object\"",
                other
            ),
        };

        Ok(Self {
            db_path,
            media_path,
            port,
            logging_level,
            environment,
            allowed_origins,
            storage,
        })
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.media_path.join("uploads")
    }

    pub fn renders_dir(&self) -> PathBuf {
        self.media_path.join("renders")
    }
}

fn require(value: Option<String>, setting: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => bail!(
            "storage_backend = \"object\" requires {} to be set in the config file",
            setting
        ),
    }
}
