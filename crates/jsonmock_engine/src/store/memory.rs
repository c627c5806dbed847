use serde_json::Value;

use jsonmock_base::JsonMockResult;

use crate::document::Document;
use crate::store::traits::DocumentStore;

/// A document store that never persists.
///
/// # Example
///
/// ```
/// use jsonmock_engine::{Document, DocumentStore, InMemoryStore};
/// use serde_json::json;
///
/// let mut store = InMemoryStore::new(Document::parse(r#"{"items": []}"#).unwrap());
/// store.replace("items", json!([{"id": 1}])).unwrap();
///
/// assert_eq!(store.document().get("items"), Some(&json!([{"id": 1}])));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    document: Document,
}

impl InMemoryStore {
    /// Create a store holding the given document.
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl DocumentStore for InMemoryStore {
    fn document(&self) -> &Document {
        &self.document
    }

    fn replace(&mut self, key: &str, value: Value) -> JsonMockResult<()> {
        self.document.insert(key, value);
        Ok(())
    }
}
