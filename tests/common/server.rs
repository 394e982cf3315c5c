//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own temp-dir database and
//! media directory.

use std::path::PathBuf;
use std::sync::Arc;

use looparchitect_server::file_store::LocalFileStore;
use looparchitect_server::loop_store::SqliteLoopStore;
use looparchitect_server::server::server::make_app;
use looparchitect_server::server::{RequestsLoggingLevel, ServerConfig};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated database and media directory.
///
/// When dropped, the server shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The media directory backing the local file store
    pub media_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawn a new test server on a random port.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("loops.db");
        let media_path = temp_dir.path().to_path_buf();

        std::fs::create_dir_all(media_path.join("uploads")).unwrap();
        std::fs::create_dir_all(media_path.join("renders")).unwrap();

        let loop_store =
            Arc::new(SqliteLoopStore::new(&db_path).expect("Failed to open loop store"));
        let file_store = Arc::new(LocalFileStore::new(media_path.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            environment: "test".to_string(),
            allowed_origins: vec!["*".to_string()],
            serve_media_path: Some(media_path.clone()),
        };

        let app = make_app(config, loop_store, file_store);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        Self {
            base_url,
            media_path,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}
