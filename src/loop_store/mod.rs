mod models;
mod schema;
mod store;
mod trait_def;

pub use models::{Loop, LoopPatch, NewLoop};
pub use store::SqliteLoopStore;
pub use trait_def::LoopStore;
