//! LoopStore trait definition.

use anyhow::Result;

use super::models::{Loop, LoopPatch, NewLoop};

/// Storage backend for loop metadata.
///
/// All mutating operations are atomic: either the full set of field changes
/// is persisted or none of it is.
pub trait LoopStore: Send + Sync {
    /// Insert a new loop and return it with its assigned id.
    fn create(&self, new_loop: NewLoop) -> Result<Loop>;

    /// Get a loop by id.
    fn get(&self, id: i64) -> Result<Option<Loop>>;

    /// List all loops in insertion order.
    fn list(&self) -> Result<Vec<Loop>>;

    /// Apply a partial update. Returns the updated loop, or `None` when the
    /// id does not exist.
    fn update(&self, id: i64, patch: LoopPatch) -> Result<Option<Loop>>;

    /// Delete a loop. Returns `false` when the id does not exist.
    fn delete(&self, id: i64) -> Result<bool>;

    /// Cheap connectivity probe for the db-health endpoint.
    fn health_check(&self) -> Result<()>;
}
