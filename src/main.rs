use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use looparchitect_server::config::{AppConfig, CliConfig, FileConfig, StorageSettings};
use looparchitect_server::file_store::build_file_store;
use looparchitect_server::loop_store::SqliteLoopStore;
use looparchitect_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite loops database file.
    #[clap(value_parser = parse_path)]
    pub loops_db: PathBuf,

    /// Path to the media directory (uploads and rendered variations).
    /// Defaults to the database's directory.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3002)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to an optional TOML config file; its values override the CLI.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    let config = AppConfig::resolve(
        &CliConfig {
            db_path: Some(cli_args.loops_db),
            media_path: cli_args.media_path,
            port: cli_args.port,
            logging_level: cli_args.logging_level,
        },
        file_config,
    )?;

    info!("Opening SQLite loops database at {:?}...", config.db_path);
    let loop_store = Arc::new(SqliteLoopStore::new(&config.db_path)?);

    let serve_media_path = match &config.storage {
        StorageSettings::Local => {
            std::fs::create_dir_all(config.uploads_dir())
                .with_context(|| format!("Failed to create {:?}", config.uploads_dir()))?;
            std::fs::create_dir_all(config.renders_dir())
                .with_context(|| format!("Failed to create {:?}", config.renders_dir()))?;
            Some(config.media_path.clone())
        }
        StorageSettings::Object(settings) => {
            info!("Using object store bucket {:?}", settings.bucket);
            None
        }
    };
    let file_store = build_file_store(&config.storage, &config.media_path);

    run_server(
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            environment: config.environment.clone(),
            allowed_origins: config.allowed_origins.clone(),
            serve_media_path,
        },
        loop_store,
        file_store,
    )
    .await
}
