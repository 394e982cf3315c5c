mod versioned_schema;

pub use versioned_schema::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

/// Offset added to `PRAGMA user_version` so a freshly created database is
/// distinguishable from one that predates schema versioning (version 0).
pub const BASE_DB_VERSION: usize = 100;
