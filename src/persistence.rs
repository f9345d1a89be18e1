use crate::dlog;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value as JsonValue;
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

/// Key under which the serialized workout collection is stored.
pub const WORKOUTS_KEY: &str = "workouts";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Where the serialized collection lives between sessions.
pub trait Persistence {
    fn save(&mut self, workouts: &JsonValue) -> StorageResult<()>;

    /// `None` on first run.
    fn load(&mut self) -> StorageResult<Option<JsonValue>>;

    fn clear(&mut self) -> StorageResult<()>;
}

/// Key/value table in a SQLite file, one row per key.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &Path) -> StorageResult<Self> {
        dlog!("opening storage path={}", path.display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS storage (
              key         TEXT PRIMARY KEY,
              value       TEXT NOT NULL,
              updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM storage WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?)
    }
}

impl Persistence for SqliteStorage {
    fn save(&mut self, workouts: &JsonValue) -> StorageResult<()> {
        let text = serde_json::to_string(workouts)?;
        self.conn.execute(
            r"
            INSERT INTO storage (key, value) VALUES (?1, ?2)
            ON CONFLICT (key) DO UPDATE SET
              value = excluded.value,
              updated_at = datetime('now')
            ",
            [WORKOUTS_KEY, text.as_str()],
        )?;
        dlog!("saved workouts bytes={}", text.len());
        Ok(())
    }

    fn load(&mut self) -> StorageResult<Option<JsonValue>> {
        let Some(text) = self.get(WORKOUTS_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn clear(&mut self) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM storage WHERE key = ?1", [WORKOUTS_KEY])?;
        Ok(())
    }
}

/// In-process storage. Clones share the same slot, so a test can keep a
/// handle while the session owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored text, if any.
    pub fn raw(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn set_raw(&self, text: impl Into<String>) {
        *self.slot.borrow_mut() = Some(text.into());
    }
}

impl Persistence for MemoryStorage {
    fn save(&mut self, workouts: &JsonValue) -> StorageResult<()> {
        *self.slot.borrow_mut() = Some(serde_json::to_string(workouts)?);
        Ok(())
    }

    fn load(&mut self) -> StorageResult<Option<JsonValue>> {
        let slot = self.slot.borrow();
        let Some(text) = slot.as_deref() else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(text)?))
    }

    fn clear(&mut self) -> StorageResult<()> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sqlite_first_run_is_absent() {
        let mut db = SqliteStorage::in_memory().unwrap();
        assert!(db.load().unwrap().is_none());
    }

    #[test]
    fn sqlite_save_overwrites_and_clear_removes() {
        let mut db = SqliteStorage::in_memory().unwrap();
        db.save(&json!([{"a": 1}])).unwrap();
        db.save(&json!([{"a": 2}, {"b": 3}])).unwrap();
        assert_eq!(db.load().unwrap(), Some(json!([{"a": 2}, {"b": 3}])));

        db.clear().unwrap();
        assert!(db.load().unwrap().is_none());
    }

    #[test]
    fn sqlite_unparsable_text_is_an_error() {
        let mut db = SqliteStorage::in_memory().unwrap();
        db.conn
            .execute(
                "INSERT INTO storage (key, value) VALUES (?1, ?2)",
                [WORKOUTS_KEY, "{not json"],
            )
            .unwrap();
        assert!(matches!(db.load(), Err(StorageError::Json(_))));
    }

    #[test]
    fn memory_clones_share_state() {
        let handle = MemoryStorage::new();
        let mut owned = handle.clone();
        owned.save(&json!([])).unwrap();
        assert_eq!(handle.raw().as_deref(), Some("[]"));
        owned.clear().unwrap();
        assert!(handle.raw().is_none());
    }
}
