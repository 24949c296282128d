use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Durable string-to-string storage. The draw core only ever talks to this
/// trait, so the backing store can be swapped for tests.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Store backed by the `kv_store` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KeyValueStore for SqliteStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to read key {key}"))
    }

    /// `INSERT OR REPLACE` keeps saves idempotent; every flush rewrites the
    /// full value.
    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .with_context(|| format!("failed to write key {key}"))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
            .with_context(|| format!("failed to delete key {key}"))?;
        Ok(())
    }
}

/// Volatile store. Clones share the same map, so a test can keep a handle
/// after boxing one into the controller.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connection::{ensure_schema, ensure_schema_in_memory};

    #[test]
    fn sqlite_store_round_trips_and_overwrites() {
        let store = SqliteStore::new(ensure_schema_in_memory().unwrap());
        assert_eq!(store.load("participants").unwrap(), None);

        store.save("participants", "[\"Ana\"]").unwrap();
        store.save("participants", "[\"Bob\"]").unwrap();
        assert_eq!(
            store.load("participants").unwrap().as_deref(),
            Some("[\"Bob\"]")
        );

        store.remove("participants").unwrap();
        assert_eq!(store.load("participants").unwrap(), None);
    }

    #[test]
    fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("raffle.sqlite");
        {
            let store = SqliteStore::new(ensure_schema(&path).unwrap());
            store.save("sessionCounter", "4").unwrap();
        }
        let store = SqliteStore::new(ensure_schema(&path).unwrap());
        assert_eq!(store.load("sessionCounter").unwrap().as_deref(), Some("4"));
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.save("winners", "[]").unwrap();
        assert_eq!(handle.len(), 1);
        handle.remove("winners").unwrap();
        assert!(store.is_empty());
    }
}
