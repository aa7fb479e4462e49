//! Keyed to-do collection and its durable JSON form.
//!
//! # Responsibility
//! - Hold one immutable-by-convention snapshot of all to-do items.
//! - Encode/decode the single JSON object persisted under `toDos`.
//!
//! # Invariants
//! - Keys are unique and equal to `ToDoItem::id`.
//! - Decoding is all-or-nothing: any malformed entry rejects the blob.
//! - Map order is not a display order; callers sort explicitly.

use crate::model::todo::{ToDoId, ToDoItem};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Errors raised while decoding a persisted collection blob.
#[derive(Debug)]
pub enum DecodeError {
    Json(serde_json::Error),
    InvalidKey(String),
    KeyMismatch { key: String, id: ToDoId },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid collection json: {err}"),
            Self::InvalidKey(key) => write!(f, "collection key `{key}` is not a valid id"),
            Self::KeyMismatch { key, id } => {
                write!(f, "collection key `{key}` does not match item id `{id}`")
            }
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidKey(_) | Self::KeyMismatch { .. } => None,
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Snapshot of all to-do items keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToDoCollection {
    items: BTreeMap<ToDoId, ToDoItem>,
}

impl ToDoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ToDoId) -> Option<&ToDoItem> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ToDoId) -> bool {
        self.items.contains_key(&id)
    }

    /// Iterates items in key order.
    pub fn iter(&self) -> impl Iterator<Item = &ToDoItem> {
        self.items.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = ToDoId> + '_ {
        self.items.keys().copied()
    }

    /// Newest `created_at` in the collection, if any.
    pub fn latest_created_at(&self) -> Option<i64> {
        self.items.values().map(|item| item.created_at).max()
    }

    /// Returns a copy with `item` stored under its own id.
    pub fn with_item(&self, item: ToDoItem) -> Self {
        let mut next = self.clone();
        next.items.insert(item.id, item);
        next
    }

    /// Returns a copy without `id`; unchanged copy when absent.
    pub fn without(&self, id: ToDoId) -> Self {
        let mut next = self.clone();
        next.items.remove(&id);
        next
    }

    /// Serializes to the durable JSON object `{ "<id>": { ...item } }`.
    pub fn to_blob(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Parses the durable JSON object produced by `to_blob`.
    ///
    /// # Errors
    /// - Invalid JSON, missing/ill-typed fields, nil ids or empty text.
    /// - A key that is not a UUID or differs from the nested item id.
    pub fn from_blob(blob: &str) -> Result<Self, DecodeError> {
        let raw: BTreeMap<String, ToDoItem> = serde_json::from_str(blob)?;
        let mut items = BTreeMap::new();
        for (key, item) in raw {
            let id = Uuid::parse_str(&key).map_err(|_| DecodeError::InvalidKey(key.clone()))?;
            if id != item.id {
                return Err(DecodeError::KeyMismatch { key, id: item.id });
            }
            items.insert(id, item);
        }
        Ok(Self { items })
    }
}

impl FromIterator<ToDoItem> for ToDoCollection {
    fn from_iter<T: IntoIterator<Item = ToDoItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().map(|item| (item.id, item)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DecodeError, ToDoCollection};
    use crate::model::todo::ToDoItem;
    use uuid::Uuid;

    const ID_A: &str = "11111111-2222-4333-8444-555555555555";
    const ID_B: &str = "66666666-7777-4888-9999-aaaaaaaaaaaa";

    #[test]
    fn with_item_does_not_touch_source_snapshot() {
        let empty = ToDoCollection::new();
        let item = ToDoItem::new("water plants", 10).unwrap();
        let next = empty.with_item(item.clone());

        assert!(empty.is_empty());
        assert_eq!(next.get(item.id), Some(&item));
    }

    #[test]
    fn without_missing_id_returns_equal_copy() {
        let collection: ToDoCollection = [ToDoItem::new("a", 1).unwrap()].into_iter().collect();
        let next = collection.without(Uuid::new_v4());
        assert_eq!(next, collection);
    }

    #[test]
    fn blob_uses_id_keyed_object_with_camel_case_fields() {
        let id = Uuid::parse_str(ID_A).unwrap();
        let item = ToDoItem::with_id(id, "Buy milk", 1_569_385_679_045).unwrap();
        let collection: ToDoCollection = [item].into_iter().collect();

        let value: serde_json::Value =
            serde_json::from_str(&collection.to_blob().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                ID_A: {
                    "id": ID_A,
                    "text": "Buy milk",
                    "isCompleted": false,
                    "createdAt": 1_569_385_679_045_i64
                }
            })
        );
    }

    #[test]
    fn from_blob_rejects_key_that_differs_from_item_id() {
        let blob = serde_json::json!({
            ID_A: { "id": ID_B, "text": "x", "isCompleted": false, "createdAt": 1 }
        })
        .to_string();

        let err = ToDoCollection::from_blob(&blob).unwrap_err();
        assert!(matches!(err, DecodeError::KeyMismatch { .. }));
    }

    #[test]
    fn from_blob_rejects_non_uuid_key() {
        let blob = serde_json::json!({
            "not-an-id": { "id": ID_A, "text": "x", "isCompleted": false, "createdAt": 1 }
        })
        .to_string();

        let err = ToDoCollection::from_blob(&blob).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidKey(key) if key == "not-an-id"));
    }

    #[test]
    fn from_blob_rejects_empty_text_and_wrong_types() {
        let empty_text = serde_json::json!({
            ID_A: { "id": ID_A, "text": "", "isCompleted": false, "createdAt": 1 }
        })
        .to_string();
        assert!(matches!(
            ToDoCollection::from_blob(&empty_text),
            Err(DecodeError::Json(_))
        ));

        let wrong_type = serde_json::json!({
            ID_A: { "id": ID_A, "text": "x", "isCompleted": "yes", "createdAt": 1 }
        })
        .to_string();
        assert!(ToDoCollection::from_blob(&wrong_type).is_err());

        assert!(ToDoCollection::from_blob("[]").is_err());
    }

    #[test]
    fn from_blob_ignores_unknown_fields() {
        let blob = serde_json::json!({
            ID_A: {
                "id": ID_A,
                "text": "x",
                "isCompleted": true,
                "createdAt": 5,
                "color": "pink"
            }
        })
        .to_string();

        let collection = ToDoCollection::from_blob(&blob).unwrap();
        let item = collection.get(Uuid::parse_str(ID_A).unwrap()).unwrap();
        assert!(item.is_completed);
        assert_eq!(item.created_at, 5);
    }

    #[test]
    fn empty_object_decodes_to_empty_collection() {
        assert!(ToDoCollection::from_blob("{}").unwrap().is_empty());
    }
}
