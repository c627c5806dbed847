/* 📖 # Why a DocumentStore trait?

Request handling only needs two things from storage: the current document and
a way to replace one top-level value. FileStore persists every replacement to
the data file, InMemoryStore does not persist at all, which keeps router and
processor tests free of file handling.
*/

/* 📖 # Why does StoreHandle expose closures instead of getters?

tiny_http connections are served on their own threads. A POST reads the
collection, validates the body, computes the next id, appends and persists.
If any other request could interleave between those steps two POSTs might get
the same id, or one write might overwrite the other. `StoreHandle::write` runs
the whole sequence under one write lock; GETs share the read lock.
*/

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use jsonmock_base::JsonMockResult;

use crate::document::Document;

/// Storage backend holding the mock database.
pub trait DocumentStore: Send + Sync + 'static {
    /// The current document.
    fn document(&self) -> &Document;

    /// Replace the value stored under `key` and persist the whole document.
    ///
    /// On error the store is left unchanged.
    fn replace(&mut self, key: &str, value: Value) -> JsonMockResult<()>;
}

/// A thread-safe handle to a document store.
///
/// Cloning is cheap; all clones share the same store and lock.
#[derive(Clone)]
pub struct StoreHandle(Arc<RwLock<dyn DocumentStore>>);

impl StoreHandle {
    /// Create a new StoreHandle wrapping the given store implementation.
    pub fn new<S: DocumentStore>(store: S) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    /// Run `f` with shared access to the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let guard = self.0.read();
        f(guard.document())
    }

    /// Run `f` with exclusive access to the store.
    pub fn write<R>(&self, f: impl FnOnce(&mut dyn DocumentStore) -> R) -> R {
        let mut guard = self.0.write();
        f(&mut *guard)
    }

    /// A copy of the current document.
    pub fn snapshot(&self) -> Document {
        self.read(Document::clone)
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("endpoints", &self.read(Document::len))
            .finish()
    }
}
