use std::path::PathBuf;

use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub environment: String,
    pub allowed_origins: Vec<String>,
    /// Media directory to serve statically; only set for the local file
    /// store backend.
    pub serve_media_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3002,
            environment: "production".to_string(),
            allowed_origins: vec!["*".to_string()],
            serve_media_path: None,
        }
    }
}
