//! SQLite-backed loop store.

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

use super::models::{Loop, LoopPatch, NewLoop};
use super::schema::LOOPS_SCHEMA;
use super::trait_def::LoopStore;

pub struct SqliteLoopStore {
    conn: Arc<Mutex<Connection>>,
}

fn row_to_loop(row: &Row) -> rusqlite::Result<Loop> {
    Ok(Loop {
        id: row.get(0)?,
        name: row.get(1)?,
        tempo: row.get(2)?,
        key: row.get(3)?,
        genre: row.get(4)?,
        file_url: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const LOOP_COLUMNS: &str = "id, name, tempo, key, genre, file_url, created_at";

impl SqliteLoopStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path.as_ref(),
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open loops database at {:?}", db_path.as_ref()))?;

        // journal_mode returns the resulting mode as a row, so query it
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |r| r.get(0))?;
        LOOPS_SCHEMA.create_or_validate(&conn)?;
        info!("Loops database ready at {:?}", db_path.as_ref());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory store for tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        LOOPS_SCHEMA.create_or_validate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn get_with_conn(conn: &Connection, id: i64) -> Result<Option<Loop>> {
        let query = format!("SELECT {} FROM loops WHERE id = ?1", LOOP_COLUMNS);
        match conn.query_row(&query, params![id], row_to_loop) {
            Ok(l) => Ok(Some(l)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl LoopStore for SqliteLoopStore {
    fn create(&self, new_loop: NewLoop) -> Result<Loop> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> Result<Loop> {
            conn.execute(
                "INSERT INTO loops (name, tempo, key, genre, file_url) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &new_loop.name,
                    new_loop.tempo,
                    &new_loop.key,
                    &new_loop.genre,
                    &new_loop.file_url,
                ],
            )?;
            let id = conn.last_insert_rowid();
            Self::get_with_conn(&conn, id)?
                .ok_or_else(|| anyhow::anyhow!("Inserted loop {} not found on re-read", id))
        })();

        match result {
            Ok(l) => {
                conn.execute("COMMIT", [])?;
                Ok(l)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn get(&self, id: i64) -> Result<Option<Loop>> {
        let conn = self.conn.lock().unwrap();
        Self::get_with_conn(&conn, id)
    }

    fn list(&self) -> Result<Vec<Loop>> {
        let conn = self.conn.lock().unwrap();
        let query = format!("SELECT {} FROM loops ORDER BY id", LOOP_COLUMNS);
        let mut stmt = conn.prepare(&query)?;
        let loops = stmt
            .query_map([], row_to_loop)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(loops)
    }

    fn update(&self, id: i64, patch: LoopPatch) -> Result<Option<Loop>> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> Result<Option<Loop>> {
            let mut existing = match Self::get_with_conn(&conn, id)? {
                Some(l) => l,
                None => return Ok(None),
            };

            patch.apply_to(&mut existing);
            conn.execute(
                "UPDATE loops SET name = ?1, tempo = ?2, key = ?3, genre = ?4, file_url = ?5 \
                 WHERE id = ?6",
                params![
                    &existing.name,
                    existing.tempo,
                    &existing.key,
                    &existing.genre,
                    &existing.file_url,
                    id,
                ],
            )?;
            Ok(Some(existing))
        })();

        match result {
            Ok(updated) => {
                conn.execute("COMMIT", [])?;
                Ok(updated)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        conn.execute("BEGIN IMMEDIATE", [])?;

        let result = (|| -> Result<bool> {
            let deleted = conn.execute("DELETE FROM loops WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })();

        match result {
            Ok(deleted) => {
                conn.execute("COMMIT", [])?;
                Ok(deleted)
            }
            Err(e) => {
                let _ = conn.execute("ROLLBACK", []);
                Err(e)
            }
        }
    }

    fn health_check(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_loop(name: &str) -> NewLoop {
        NewLoop {
            name: name.to_string(),
            tempo: Some(120.0),
            key: Some("C minor".to_string()),
            genre: Some("trap".to_string()),
            file_url: None,
        }
    }

    #[test]
    fn create_assigns_sequential_ids_and_created_at() {
        let store = SqliteLoopStore::in_memory().unwrap();
        let first = store.create(new_loop("one")).unwrap();
        let second = store.create(new_loop("two")).unwrap();

        assert!(first.id < second.id);
        assert!(first.created_at > 0);
        assert_eq!(first.name, "one");
        assert_eq!(first.tempo, Some(120.0));
    }

    #[test]
    fn get_returns_none_for_unknown_id() {
        let store = SqliteLoopStore::in_memory().unwrap();
        assert!(store.get(999).unwrap().is_none());
    }

    #[test]
    fn list_returns_insertion_order() {
        let store = SqliteLoopStore::in_memory().unwrap();
        store.create(new_loop("a")).unwrap();
        store.create(new_loop("b")).unwrap();
        store.create(new_loop("c")).unwrap();

        let names: Vec<String> = store.list().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn update_touches_only_supplied_fields() {
        let store = SqliteLoopStore::in_memory().unwrap();
        let created = store.create(new_loop("keep me")).unwrap();

        let updated = store
            .update(
                created.id,
                LoopPatch {
                    tempo: Some(128.0),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.tempo, Some(128.0));
        assert_eq!(updated.name, "keep me");
        assert_eq!(updated.key.as_deref(), Some("C minor"));
        assert_eq!(updated.genre.as_deref(), Some("trap"));
        assert_eq!(updated.created_at, created.created_at);

        // Persisted, not just echoed
        let reread = store.get(created.id).unwrap().unwrap();
        assert_eq!(reread, updated);
    }

    #[test]
    fn update_unknown_id_returns_none() {
        let store = SqliteLoopStore::in_memory().unwrap();
        let result = store.update(42, LoopPatch::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn delete_is_idempotent_about_missing_rows() {
        let store = SqliteLoopStore::in_memory().unwrap();
        let created = store.create(new_loop("goner")).unwrap();

        assert!(store.delete(created.id).unwrap());
        assert!(!store.delete(created.id).unwrap());
        assert!(store.get(created.id).unwrap().is_none());
    }

    #[test]
    fn health_check_succeeds_on_open_store() {
        let store = SqliteLoopStore::in_memory().unwrap();
        store.health_check().unwrap();
    }
}
