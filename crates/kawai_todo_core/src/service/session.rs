//! UI-owned state container for the to-do screen.
//!
//! # Responsibility
//! - Hold the current snapshot, load state and the new-item draft.
//! - Route UI callbacks to `ToDoStore` and swap in the returned snapshot.
//! - Produce the newest-first display order.
//!
//! # Invariants
//! - Mutations before `load()` are rejected, so an empty pre-load snapshot
//!   can never overwrite durable state.
//! - Display order is computed by sorting, never taken from map order.

use crate::gateway::PersistenceGateway;
use crate::model::collection::ToDoCollection;
use crate::model::todo::{ToDoId, ToDoItem};
use crate::service::todo_store::ToDoStore;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `load()` has not completed yet.
    NotLoaded,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "to-do list is still loading"),
        }
    }
}

impl Error for SessionError {}

pub type SessionResult<'a> = Result<&'a ToDoCollection, SessionError>;

/// Outcome of resolving an abbreviated id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdPrefixMatch {
    Unique(ToDoId),
    Missing,
    Ambiguous(usize),
}

/// Current screen state plus the store that derives the next one.
pub struct ToDoSession<G: PersistenceGateway> {
    store: ToDoStore<G>,
    snapshot: ToDoCollection,
    loaded: bool,
    draft: String,
}

impl<G: PersistenceGateway> ToDoSession<G> {
    pub fn new(store: ToDoStore<G>) -> Self {
        Self {
            store,
            snapshot: ToDoCollection::new(),
            loaded: false,
            draft: String::new(),
        }
    }

    /// Replaces the snapshot with the persisted collection.
    pub fn load(&mut self) -> &ToDoCollection {
        self.snapshot = self.store.initialize();
        self.loaded = true;
        &self.snapshot
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn snapshot(&self) -> &ToDoCollection {
        &self.snapshot
    }

    pub fn store(&self) -> &ToDoStore<G> {
        &self.store
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Adds the draft as a new item; the draft is cleared only when an item
    /// was created.
    pub fn submit_draft(&mut self) -> SessionResult<'_> {
        self.ensure_loaded()?;
        let before = self.snapshot.len();
        self.snapshot = self.store.add(&self.snapshot, &self.draft);
        if self.snapshot.len() > before {
            self.draft.clear();
        }
        Ok(&self.snapshot)
    }

    pub fn add(&mut self, text: &str) -> SessionResult<'_> {
        self.apply(|store, current| store.add(current, text))
    }

    pub fn complete(&mut self, id: ToDoId) -> SessionResult<'_> {
        self.apply(|store, current| store.set_completed(current, id, true))
    }

    pub fn uncomplete(&mut self, id: ToDoId) -> SessionResult<'_> {
        self.apply(|store, current| store.set_completed(current, id, false))
    }

    pub fn update_text(&mut self, id: ToDoId, text: &str) -> SessionResult<'_> {
        self.apply(|store, current| store.update_text(current, id, text))
    }

    pub fn delete(&mut self, id: ToDoId) -> SessionResult<'_> {
        self.apply(|store, current| store.remove(current, id))
    }

    /// Items sorted newest first; equal timestamps order by id descending.
    pub fn display_items(&self) -> Vec<&ToDoItem> {
        let mut items = self.snapshot.iter().collect::<Vec<_>>();
        items.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        items
    }

    /// Resolves a case-insensitive prefix of the hyphenated id.
    pub fn find_by_id_prefix(&self, prefix: &str) -> IdPrefixMatch {
        let needle = prefix.trim().to_ascii_lowercase();
        if needle.is_empty() {
            return IdPrefixMatch::Missing;
        }

        let matches = self
            .snapshot
            .ids()
            .filter(|id| id.to_string().starts_with(&needle))
            .collect::<Vec<_>>();
        match matches.as_slice() {
            [] => IdPrefixMatch::Missing,
            [id] => IdPrefixMatch::Unique(*id),
            many => IdPrefixMatch::Ambiguous(many.len()),
        }
    }

    fn ensure_loaded(&self) -> Result<(), SessionError> {
        if self.loaded {
            Ok(())
        } else {
            Err(SessionError::NotLoaded)
        }
    }

    fn apply(
        &mut self,
        operation: impl FnOnce(&ToDoStore<G>, &ToDoCollection) -> ToDoCollection,
    ) -> SessionResult<'_> {
        self.ensure_loaded()?;
        self.snapshot = operation(&self.store, &self.snapshot);
        Ok(&self.snapshot)
    }
}
