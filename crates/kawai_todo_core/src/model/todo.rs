//! To-do item model.
//!
//! # Responsibility
//! - Define the record rendered as one row of the to-do list.
//! - Provide copy-returning helpers for the two mutable fields.
//!
//! # Invariants
//! - `id` and `created_at` never change after construction.
//! - `text` is never the exact empty string.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one to-do item.
pub type ToDoId = Uuid;

/// Validation errors for malformed to-do records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToDoValidationError {
    NilId,
    EmptyText,
}

impl Display for ToDoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "to-do id must not be nil"),
            Self::EmptyText => write!(f, "to-do text must not be empty"),
        }
    }
}

impl Error for ToDoValidationError {}

/// One user-entered task record.
///
/// Serialized with the field names of the durable record:
/// `id`, `text`, `isCompleted`, `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ToDoItemWire")]
pub struct ToDoItem {
    pub id: ToDoId,
    pub text: String,
    pub is_completed: bool,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToDoItemWire {
    id: ToDoId,
    text: String,
    is_completed: bool,
    created_at: i64,
}

impl TryFrom<ToDoItemWire> for ToDoItem {
    type Error = ToDoValidationError;

    fn try_from(value: ToDoItemWire) -> Result<Self, Self::Error> {
        let item = Self {
            id: value.id,
            text: value.text,
            is_completed: value.is_completed,
            created_at: value.created_at,
        };
        item.validate()?;
        Ok(item)
    }
}

impl ToDoItem {
    /// Creates an open item with a freshly generated id.
    pub fn new(text: impl Into<String>, created_at: i64) -> Result<Self, ToDoValidationError> {
        Self::with_id(Uuid::new_v4(), text, created_at)
    }

    /// Creates an open item with a caller-provided id.
    ///
    /// Used by tests and import paths where identity already exists.
    pub fn with_id(
        id: ToDoId,
        text: impl Into<String>,
        created_at: i64,
    ) -> Result<Self, ToDoValidationError> {
        let item = Self {
            id,
            text: text.into(),
            is_completed: false,
            created_at,
        };
        item.validate()?;
        Ok(item)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), ToDoValidationError> {
        if self.id.is_nil() {
            return Err(ToDoValidationError::NilId);
        }
        if self.text.is_empty() {
            return Err(ToDoValidationError::EmptyText);
        }
        Ok(())
    }

    /// Returns a copy with the completion flag replaced.
    pub fn with_completed(&self, completed: bool) -> Self {
        Self {
            is_completed: completed,
            ..self.clone()
        }
    }

    /// Returns a copy with the text replaced.
    ///
    /// Empty text is rejected so an edit cannot break the record invariant.
    pub fn with_text(&self, text: impl Into<String>) -> Result<Self, ToDoValidationError> {
        let text = text.into();
        if text.is_empty() {
            return Err(ToDoValidationError::EmptyText);
        }
        Ok(Self {
            text,
            ..self.clone()
        })
    }

    /// First eight characters of the hyphenated id, for compact listings.
    pub fn short_id(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }
}
