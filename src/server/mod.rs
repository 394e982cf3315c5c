pub mod config;
mod http_layers;
mod loop_routes;
mod render_routes;
pub mod server;
pub mod state;
mod upload_routes;

pub use config::ServerConfig;
pub use http_layers::*;
#[allow(unused_imports)] // Used by main.rs
pub use server::run_server;
