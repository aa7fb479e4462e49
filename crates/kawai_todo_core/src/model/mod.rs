//! To-do domain model.
//!
//! # Responsibility
//! - Define the canonical to-do record and its keyed collection.
//! - Own the durable JSON shape of a collection snapshot.
//!
//! # Invariants
//! - Every item is identified by a stable, non-nil `ToDoId`.
//! - A collection key always equals the id of the item stored under it.

pub mod collection;
pub mod todo;
