//! SQLite-backed `KeyValueStore`.
//!
//! # Invariants
//! - The connection must already be migrated (`open_db`/`open_db_in_memory`).
//! - `set` is an upsert; one row per key.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value rows in the `kv_store` table.
pub struct SqliteKvStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteKvStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `StoreError::Unavailable` when the schema version does not match
    ///   this build.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let actual = current_user_version(conn)?;
        let expected = latest_version();
        if actual != expected {
            return Err(StoreError::Unavailable(format!(
                "kv store requires schema version {expected}, got {actual}"
            )));
        }
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteKvStore<'_> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}
