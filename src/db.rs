use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, TallyError};
use crate::store::KeyValueStore;

pub const DB_FILE: &str = "tally.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Key-value store backed by a single SQLite table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = get_connection(db_path)?;
        init_db(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(|e| TallyError::StorageUnavailable(e.to_string()))
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now')) \
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value],
            )
            .map_err(|e| TallyError::StorageUnavailable(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join(DB_FILE)).unwrap();
        (dir, store)
    }

    #[test]
    fn test_init_db_creates_kv_table() {
        let (_dir, store) = test_store();
        let tables: Vec<String> = store
            .connection()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();
        assert!(tables.contains(&"kv_store".to_string()), "missing table: kv_store");
    }

    #[test]
    fn test_init_db_is_idempotent() {
        let (_dir, store) = test_store();
        init_db(store.connection()).unwrap();
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, store) = test_store();
        assert_eq!(store.get("absent").unwrap(), None);
    }

    #[test]
    fn test_set_then_get_overwrites() {
        let (_dir, mut store) = test_store();
        store.set("k", b"[1]").unwrap();
        store.set("k", b"[2]").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"[2]"[..]));
        let rows: i64 = store
            .connection()
            .query_row("SELECT count(*) FROM kv_store", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let mut store = SqliteStore::open(&path).unwrap();
            store.set("k", b"persisted").unwrap();
        }
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"persisted"[..]));
    }

    #[test]
    fn test_write_to_readonly_db_is_storage_unavailable() {
        let (_dir, mut store) = test_store();
        store.connection().execute_batch("PRAGMA query_only = ON;").unwrap();
        let err = store.set("k", b"x").unwrap_err();
        assert!(matches!(err, TallyError::StorageUnavailable(_)), "got: {err}");
    }
}
