use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache store is poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// A single persistent key-value slot
///
/// The gallery only ever keeps one cached payload, so a store is bound to
/// its key when it is created and callers just read or overwrite it.
pub trait SnapshotStore: Send + Sync {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, payload: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Slot backed by a row in a SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(db_path: P, key: impl Into<String>) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, key)
    }

    pub fn in_memory(key: impl Into<String>) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, key)
    }

    fn with_connection(conn: Connection, key: impl Into<String>) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            key: key.into(),
        })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS slots (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                written_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl SnapshotStore for SqliteStore {
    fn read(&self) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        let data = conn
            .query_row(
                "SELECT data FROM slots WHERE key = ?1",
                params![self.key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(data)
    }

    fn write(&self, payload: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        conn.execute(
            "INSERT INTO slots (key, data, written_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET data = excluded.data, written_at = excluded.written_at",
            params![self.key, payload, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| CacheError::Poisoned)?;
        conn.execute("DELETE FROM slots WHERE key = ?1", params![self.key])?;
        Ok(())
    }
}

/// Process-local slot, handy for tests and one-shot runs
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(payload.into())),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.lock().map_err(|_| CacheError::Poisoned)?.clone())
    }

    fn write(&self, payload: &str) -> Result<()> {
        *self.slot.lock().map_err(|_| CacheError::Poisoned)? = Some(payload.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().map_err(|_| CacheError::Poisoned)? = None;
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for std::sync::Arc<S> {
    fn read(&self) -> Result<Option<String>> {
        (**self).read()
    }

    fn write(&self, payload: &str) -> Result<()> {
        (**self).write(payload)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sqlite_slot_overwrites() {
        let store = SqliteStore::in_memory("gallery").unwrap();
        assert_eq!(store.read().unwrap(), None);

        store.write("first").unwrap();
        store.write("second").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("second"));

        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn test_sqlite_slot_persists_across_connections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("cache.db");

        {
            let store = SqliteStore::open(&path, "gallery").unwrap();
            store.write("{\"hello\":1}").unwrap();
        }

        let store = SqliteStore::open(&path, "gallery").unwrap();
        assert_eq!(store.read().unwrap().as_deref(), Some("{\"hello\":1}"));

        // Different key, different slot
        let other = SqliteStore::open(&path, "other").unwrap();
        assert_eq!(other.read().unwrap(), None);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_payload("cached");
        assert_eq!(store.read().unwrap().as_deref(), Some("cached"));
        store.clear().unwrap();
        assert!(store.read().unwrap().is_none());
    }
}
