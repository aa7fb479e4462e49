//! To-do use-case services.
//!
//! # Responsibility
//! - `ToDoStore`: copy-on-write collection operations plus persistence.
//! - `ToDoSession`: the UI-owned container for the current snapshot.
//!
//! # Invariants
//! - No service API mutates a snapshot it was handed.
//! - Storage failures are logged here and never reach the UI.

pub mod session;
pub mod todo_store;
