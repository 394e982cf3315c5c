use anyhow::{bail, Result};
use rusqlite::{params, types::Type, Connection};

use super::BASE_DB_VERSION;

/// SQL expression for an insert-time unix timestamp default.
pub const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // unused_mut: only mutated when optional field assignments are
            // passed (e.g. `non_null = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                default_value: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

pub struct Column<'a, S: AsRef<str>> {
    pub name: S,
    pub sql_type: &'a SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    pub default_value: Option<S>,
}

pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column<'static, &'static str>],
    pub indices: &'static [(&'static str, &'static str)],
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(column.name);
            create_sql.push(' ');
            create_sql.push_str(column.sql_type.sql_name());
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if let Some(default_value) = column.default_value {
                create_sql.push_str(&format!(" DEFAULT {}", default_value));
            }
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;

        for (index_name, column_name) in self.indices {
            conn.execute(
                &format!(
                    "CREATE INDEX {} ON {}({});",
                    index_name, self.name, column_name
                ),
                params![],
            )?;
        }
        Ok(())
    }
}

pub struct VersionedSchema {
    pub version: usize,
    pub tables: &'static [Table],
}

impl VersionedSchema {
    /// Create all tables and stamp the schema version.
    pub fn create(&self, conn: &Connection) -> Result<()> {
        for table in self.tables {
            table.create(conn)?;
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + self.version),
            [],
        )?;
        Ok(())
    }

    /// Check an existing database against the declared tables. Catches the
    /// common failure of opening a database file that belongs to another
    /// application or schema generation.
    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        if db_version != (BASE_DB_VERSION + self.version) as i64 {
            bail!(
                "Database schema version mismatch: found {}, expected {}",
                db_version,
                BASE_DB_VERSION + self.version
            );
        }

        for table in self.tables {
            let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", table.name))?;
            let actual_columns: Vec<(String, &'static SqlType, bool)> = stmt
                .query_map(params![], |row| {
                    let name = row.get::<usize, String>(1)?;
                    let sql_type = match row.get::<_, String>(2)?.as_str() {
                        "TEXT" => &SqlType::Text,
                        "INTEGER" => &SqlType::Integer,
                        "REAL" => &SqlType::Real,
                        _ => return Err(rusqlite::Error::InvalidColumnType(2, name, Type::Text)),
                    };
                    let non_null = row.get::<_, i32>(3)? == 1;
                    Ok((name, sql_type, non_null))
                })?
                .collect::<Result<_, _>>()?;

            if actual_columns.len() != table.columns.len() {
                bail!(
                    "Table {} has {} columns, expected {} ({})",
                    table.name,
                    actual_columns.len(),
                    table.columns.len(),
                    table
                        .columns
                        .iter()
                        .map(|c| c.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }

            for ((actual_name, actual_type, actual_non_null), expected) in
                actual_columns.iter().zip(table.columns.iter())
            {
                if actual_name != expected.name {
                    bail!(
                        "Table {} column name mismatch: expected {}, got {}",
                        table.name,
                        expected.name,
                        actual_name
                    );
                }
                if *actual_type != expected.sql_type {
                    bail!(
                        "Table {} column {} type mismatch: expected {:?}, got {:?}",
                        table.name,
                        expected.name,
                        expected.sql_type,
                        actual_type
                    );
                }
                if *actual_non_null != expected.non_null {
                    bail!(
                        "Table {} column {} non-null mismatch: expected {}, got {}",
                        table.name,
                        expected.name,
                        expected.non_null,
                        actual_non_null
                    );
                }
            }
        }
        Ok(())
    }

    /// Create the schema on a brand new database, validate an existing one.
    pub fn create_or_validate(&self, conn: &Connection) -> Result<()> {
        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);

        if table_count == 0 {
            self.create(conn)
        } else {
            self.validate(conn)
        }
    }
}
