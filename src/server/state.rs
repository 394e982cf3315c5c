use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::file_store::FileStore;
use crate::loop_store::LoopStore;
use crate::render::Renderer;

use super::ServerConfig;

pub type GuardedLoopStore = Arc<dyn LoopStore>;
pub type GuardedFileStore = Arc<dyn FileStore>;
pub type GuardedRenderer = Arc<Renderer>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub loop_store: GuardedLoopStore,
    pub file_store: GuardedFileStore,
    pub renderer: GuardedRenderer,
}

impl FromRef<ServerState> for GuardedLoopStore {
    fn from_ref(input: &ServerState) -> Self {
        input.loop_store.clone()
    }
}

impl FromRef<ServerState> for GuardedFileStore {
    fn from_ref(input: &ServerState) -> Self {
        input.file_store.clone()
    }
}

impl FromRef<ServerState> for GuardedRenderer {
    fn from_ref(input: &ServerState) -> Self {
        input.renderer.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
