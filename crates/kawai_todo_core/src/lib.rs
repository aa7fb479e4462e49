//! Core domain logic for the kawai-todo list.
//! This crate owns the to-do data model, its durable storage and the
//! operations every front end goes through.

pub mod config;
pub mod db;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod service;

pub use config::AppConfig;
pub use gateway::{
    GatewayError, GatewayResult, MemoryGateway, PersistenceGateway, QueuedGateway,
    SqliteKvGateway, TODOS_STORAGE_KEY,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::collection::{DecodeError, ToDoCollection};
pub use model::todo::{ToDoId, ToDoItem, ToDoValidationError};
pub use service::session::{IdPrefixMatch, SessionError, SessionResult, ToDoSession};
pub use service::todo_store::{system_clock_ms, Clock, ToDoStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
