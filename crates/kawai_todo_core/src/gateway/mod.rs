//! Durable storage collaborators for collection snapshots.
//!
//! # Responsibility
//! - Define the two-operation contract (`load`/`save`) consumed by the store.
//! - Provide SQLite, in-memory and background-writer implementations.
//!
//! # Invariants
//! - A gateway holds at most one blob, under one fixed key.
//! - `save` overwrites the previous blob completely or fails without effect.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod memory;
pub mod queued;
pub mod sqlite;

pub use memory::MemoryGateway;
pub use queued::QueuedGateway;
pub use sqlite::{SqliteKvGateway, TODOS_STORAGE_KEY};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure surface of durable storage.
#[derive(Debug)]
pub enum GatewayError {
    Db(DbError),
    Io(std::io::Error),
    /// Storage refused the operation (simulated outages, closed backends).
    Unavailable(String),
    /// Background writer is gone; the request was not delivered.
    WorkerStopped,
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
            Self::WorkerStopped => write!(f, "storage writer stopped"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Unavailable(_) | Self::WorkerStopped => None,
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for GatewayError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Key-value durable storage for the serialized collection.
pub trait PersistenceGateway {
    /// Returns the last saved blob, or `None` before the first save.
    fn load(&self) -> GatewayResult<Option<String>>;
    /// Replaces the stored blob.
    fn save(&self, blob: &str) -> GatewayResult<()>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &G {
    fn load(&self) -> GatewayResult<Option<String>> {
        (**self).load()
    }

    fn save(&self, blob: &str) -> GatewayResult<()> {
        (**self).save(blob)
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Arc<G> {
    fn load(&self) -> GatewayResult<Option<String>> {
        (**self).load()
    }

    fn save(&self, blob: &str) -> GatewayResult<()> {
        (**self).save(blob)
    }
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for Box<G> {
    fn load(&self) -> GatewayResult<Option<String>> {
        (**self).load()
    }

    fn save(&self, blob: &str) -> GatewayResult<()> {
        (**self).save(blob)
    }
}
