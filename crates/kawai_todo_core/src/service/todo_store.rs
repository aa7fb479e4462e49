//! To-do store operations.
//!
//! # Responsibility
//! - Derive a new collection snapshot for every user action.
//! - Persist each new snapshot through the injected gateway.
//!
//! # Invariants
//! - Inputs are borrowed snapshots; results are independent copies.
//! - Unknown ids never produce new entries.
//! - `created_at` strictly increases across successive `add` calls, so it
//!   doubles as insertion order.
//! - No operation returns an error or panics; storage problems are logged.

use crate::gateway::PersistenceGateway;
use crate::model::collection::ToDoCollection;
use crate::model::todo::{ToDoId, ToDoItem};
use log::{debug, error, info, warn};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Source of creation timestamps in epoch milliseconds.
pub type Clock = Box<dyn Fn() -> i64 + Send>;

/// Wall-clock time in epoch milliseconds; `0` if the clock predates 1970.
pub fn system_clock_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Stateless operation set over collection snapshots.
pub struct ToDoStore<G: PersistenceGateway> {
    gateway: G,
    clock: Clock,
}

impl<G: PersistenceGateway> ToDoStore<G> {
    pub fn new(gateway: G) -> Self {
        Self::with_clock(gateway, Box::new(system_clock_ms))
    }

    pub fn with_clock(gateway: G, clock: Clock) -> Self {
        Self { gateway, clock }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Loads the persisted collection.
    ///
    /// Missing records, storage errors and undecodable blobs all yield an
    /// empty collection.
    pub fn initialize(&self) -> ToDoCollection {
        let blob = match self.gateway.load() {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("event=todo_load module=store status=empty reason=no_record");
                return ToDoCollection::new();
            }
            Err(err) => {
                warn!(
                    "event=todo_load module=store status=reset error_code=load_failed error={err}"
                );
                return ToDoCollection::new();
            }
        };

        match ToDoCollection::from_blob(&blob) {
            Ok(collection) => {
                info!(
                    "event=todo_load module=store status=ok count={}",
                    collection.len()
                );
                collection
            }
            Err(err) => {
                warn!(
                    "event=todo_load module=store status=reset error_code=decode_failed bytes={} error={err}",
                    blob.len()
                );
                ToDoCollection::new()
            }
        }
    }

    /// Appends a new open item.
    ///
    /// The exact empty string is rejected without saving; no trimming.
    pub fn add(&self, current: &ToDoCollection, text: &str) -> ToDoCollection {
        if text.is_empty() {
            debug!("event=todo_add module=store status=skipped reason=empty_text");
            return current.clone();
        }

        let mut id = Uuid::new_v4();
        while current.contains(id) {
            id = Uuid::new_v4();
        }

        let item = match ToDoItem::with_id(id, text, self.next_created_at(current)) {
            Ok(item) => item,
            Err(err) => {
                warn!("event=todo_add module=store status=skipped error={err}");
                return current.clone();
            }
        };

        let next = current.with_item(item);
        info!(
            "event=todo_add module=store status=ok id={id} count={}",
            next.len()
        );
        self.persist(&next, "todo_add");
        next
    }

    /// Removes `id`; absent ids leave the collection unchanged.
    pub fn remove(&self, current: &ToDoCollection, id: ToDoId) -> ToDoCollection {
        let next = current.without(id);
        info!(
            "event=todo_remove module=store status={} id={id} count={}",
            if current.contains(id) { "ok" } else { "missing" },
            next.len()
        );
        self.persist(&next, "todo_remove");
        next
    }

    /// Sets the completion flag of an existing item.
    pub fn set_completed(
        &self,
        current: &ToDoCollection,
        id: ToDoId,
        completed: bool,
    ) -> ToDoCollection {
        let next = match current.get(id) {
            Some(item) => {
                info!(
                    "event=todo_set_completed module=store status=ok id={id} completed={completed}"
                );
                current.with_item(item.with_completed(completed))
            }
            None => {
                debug!("event=todo_set_completed module=store status=missing id={id}");
                current.clone()
            }
        };
        self.persist(&next, "todo_set_completed");
        next
    }

    /// Replaces the text of an existing item.
    ///
    /// Empty text is rejected without saving, same as `add`.
    pub fn update_text(&self, current: &ToDoCollection, id: ToDoId, text: &str) -> ToDoCollection {
        let Some(item) = current.get(id) else {
            debug!("event=todo_update_text module=store status=missing id={id}");
            let next = current.clone();
            self.persist(&next, "todo_update_text");
            return next;
        };

        match item.with_text(text) {
            Ok(updated) => {
                let next = current.with_item(updated);
                info!("event=todo_update_text module=store status=ok id={id}");
                self.persist(&next, "todo_update_text");
                next
            }
            Err(err) => {
                debug!(
                    "event=todo_update_text module=store status=skipped id={id} error={err}"
                );
                current.clone()
            }
        }
    }

    fn next_created_at(&self, current: &ToDoCollection) -> i64 {
        let now = (self.clock)();
        current
            .latest_created_at()
            .map_or(now, |latest| now.max(latest.saturating_add(1)))
    }

    fn persist(&self, collection: &ToDoCollection, event: &'static str) {
        let blob = match collection.to_blob() {
            Ok(blob) => blob,
            Err(err) => {
                error!(
                    "event={event} module=store status=error error_code=encode_failed error={err}"
                );
                return;
            }
        };
        if let Err(err) = self.gateway.save(&blob) {
            error!("event={event} module=store status=error error_code=save_failed error={err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{system_clock_ms, ToDoStore};
    use crate::gateway::MemoryGateway;
    use crate::model::collection::ToDoCollection;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(system_clock_ms() > 1_577_836_800_000);
    }

    #[test]
    fn created_at_does_not_go_backwards_when_clock_does() {
        let store = ToDoStore::with_clock(MemoryGateway::new(), Box::new(|| 100));
        let seeded = ToDoStore::with_clock(MemoryGateway::new(), Box::new(|| 500))
            .add(&ToDoCollection::new(), "later");

        let next = store.add(&seeded, "earlier clock");
        let mut stamps = next.iter().map(|item| item.created_at).collect::<Vec<_>>();
        stamps.sort_unstable();
        assert_eq!(stamps, vec![500, 501]);
    }

    #[test]
    fn same_millisecond_adds_get_distinct_increasing_stamps() {
        let store = ToDoStore::with_clock(MemoryGateway::new(), Box::new(|| 1_000));
        let one = store.add(&ToDoCollection::new(), "first");
        let two = store.add(&one, "second");
        let three = store.add(&two, "third");

        let mut stamps = three.iter().map(|item| item.created_at).collect::<Vec<_>>();
        stamps.sort_unstable();
        assert_eq!(stamps, vec![1_000, 1_001, 1_002]);
    }

    #[test]
    fn rejected_operations_do_not_save() {
        let gateway = MemoryGateway::new();
        let store = ToDoStore::new(&gateway);
        let one = store.add(&ToDoCollection::new(), "x");
        let id = one.ids().next().unwrap();
        assert_eq!(gateway.save_count(), 1);

        store.add(&one, "");
        store.update_text(&one, id, "");
        assert_eq!(gateway.save_count(), 1);
    }
}
