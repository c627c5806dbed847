use serde_json::Value;
use tracing::{debug, info, instrument};

use jsonmock_base::{FilePath, JsonMockResult, PalHandle, ResultExt};

use crate::document::Document;
use crate::store::traits::DocumentStore;

/// A document store backed by a JSON file.
///
/// The file is read once when the store is loaded. Every `replace` rewrites
/// the whole file before the change becomes visible in memory.
#[derive(Debug)]
pub struct FileStore {
    pal: PalHandle,
    path: FilePath,
    document: Document,
}

impl FileStore {
    /// Load the data file at `path`.
    #[instrument(skip(pal), fields(path = %path))]
    pub fn load(pal: PalHandle, path: FilePath) -> JsonMockResult<Self> {
        let text = pal
            .read_file_to_string(&path)
            .with_context(|| format!("Failed to read data file {}", path))?;
        let document =
            Document::parse(&text).with_context(|| format!("Failed to load data file {}", path))?;
        info!(endpoints = document.len(), "loaded data file");
        Ok(Self {
            pal,
            path,
            document,
        })
    }

    /// Path of the backing data file.
    pub fn path(&self) -> &FilePath {
        &self.path
    }
}

impl DocumentStore for FileStore {
    fn document(&self) -> &Document {
        &self.document
    }

    #[instrument(skip(self, value), fields(path = %self.path))]
    fn replace(&mut self, key: &str, value: Value) -> JsonMockResult<()> {
        let mut candidate = self.document.clone();
        candidate.insert(key, value);
        let text = candidate.to_json_pretty()?;
        self.pal
            .write_file(&self.path, text.as_bytes())
            .with_context(|| format!("Failed to persist data file {}", self.path))?;
        self.document = candidate;
        debug!(bytes = text.len(), "persisted data file");
        Ok(())
    }
}
