//! Document store abstraction.
//!
//! Records live in named collections as JSON objects addressed by opaque
//! string ids. `DocumentStore` is the seam services depend on; the SQLite
//! implementation lives in `sqlite_store`.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document does not exist.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Stored or supplied data is not a JSON object, or a field name is unusable.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Backend failure (database, I/O).
    #[error("Storage error: {0}")]
    Storage(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidDocument(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sort direction for ordered reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A stored document: its id plus top-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Map<String, Value>,
}

impl Document {
    /// String field, `None` when absent, null or not a string.
    pub fn str_field(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.data.get(key).and_then(Value::as_bool)
    }

    /// List-of-strings field; non-string items are dropped.
    pub fn string_list_field(&self, key: &str) -> Option<Vec<String>> {
        self.data.get(key).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    /// Raw field value, `Value::Null` when absent.
    pub fn raw_field(&self, key: &str) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }
}

/// Collection-scoped document storage.
///
/// Implementations must be usable from multiple threads; services call them
/// from `spawn_blocking`.
pub trait DocumentStore: Send + Sync {
    /// Persist a new document and return its store-assigned id.
    fn insert(&self, collection: &str, data: Map<String, Value>) -> StoreResult<String>;

    /// All documents in insertion order.
    fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// All documents ordered by a top-level field (missing values sort as null).
    fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: Direction,
    ) -> StoreResult<Vec<Document>>;

    /// Fetch a document; `None` if it doesn't exist.
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// Merge `patch` into the document's top-level fields.
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the document doesn't exist.
    fn update(&self, collection: &str, id: &str, patch: Map<String, Value>) -> StoreResult<()>;

    /// Merge `patch` only if `field` currently equals `expected` (absent counts
    /// as null). Returns whether the write was applied; a missing document
    /// yields `Ok(false)`.
    fn update_if(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        expected: &Value,
        patch: Map<String, Value>,
    ) -> StoreResult<bool>;

    /// Remove a document. Removing a missing id succeeds.
    fn delete(&self, collection: &str, id: &str) -> StoreResult<()>;
}

pub type SharedStore = Arc<dyn DocumentStore>;

/// Run a blocking store operation off the async runtime.
pub async fn run_blocking<F, R>(store: &SharedStore, op: F) -> Result<R, tokio::task::JoinError>
where
    F: FnOnce(&dyn DocumentStore) -> R + Send + 'static,
    R: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || op(store.as_ref())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document {
            id: "d1".to_string(),
            data: value.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_field_accessors() {
        let d = doc(json!({
            "name": "Rust",
            "done": true,
            "crops": ["wheat", 3, "barley"],
            "note": null
        }));

        assert_eq!(d.str_field("name").as_deref(), Some("Rust"));
        assert_eq!(d.str_field("note"), None);
        assert_eq!(d.str_field("missing"), None);
        assert_eq!(d.bool_field("done"), Some(true));
        assert_eq!(
            d.string_list_field("crops"),
            Some(vec!["wheat".to_string(), "barley".to_string()])
        );
        assert_eq!(d.raw_field("missing"), Value::Null);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::not_found("tasks", "abc");
        assert_eq!(err.to_string(), "Document not found: tasks/abc");
    }
}
