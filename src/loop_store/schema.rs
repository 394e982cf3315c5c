//! Declarative schema for the loops database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

/// Loops table. `id` is the integer rowid alias, assigned on insert.
const LOOPS_TABLE: Table = Table {
    name: "loops",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("tempo", &SqlType::Real),
        sqlite_column!("key", &SqlType::Text),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("file_url", &SqlType::Text),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_loops_name", "name")],
};

pub const LOOPS_SCHEMA: VersionedSchema = VersionedSchema {
    version: 0,
    tables: &[LOOPS_TABLE],
};
