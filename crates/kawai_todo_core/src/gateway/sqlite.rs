//! SQLite-backed key-value gateway.
//!
//! # Invariants
//! - All reads/writes target `kv_store` rows keyed by `self.key`.
//! - Each save is one upsert statement.

use super::{GatewayResult, PersistenceGateway};
use crate::db::open_db;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Storage key of the to-do collection blob.
pub const TODOS_STORAGE_KEY: &str = "toDos";

/// Durable gateway over a migrated SQLite connection.
pub struct SqliteKvGateway {
    conn: Connection,
    key: String,
}

impl SqliteKvGateway {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self::with_key(conn, TODOS_STORAGE_KEY)
    }

    pub fn with_key(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn,
            key: key.into(),
        }
    }

    /// Opens (and migrates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> GatewayResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PersistenceGateway for SqliteKvGateway {
    fn load(&self) -> GatewayResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        debug!(
            "event=kv_load module=gateway status=ok mode=sqlite found={}",
            value.is_some()
        );
        Ok(value)
    }

    fn save(&self, blob: &str) -> GatewayResult<()> {
        let result = self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), blob],
        );
        match result {
            Ok(_) => {
                debug!(
                    "event=kv_save module=gateway status=ok mode=sqlite bytes={}",
                    blob.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=kv_save module=gateway status=error mode=sqlite error_code=kv_upsert_failed error={err}"
                );
                Err(err.into())
            }
        }
    }
}
