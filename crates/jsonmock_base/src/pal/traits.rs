use std::io::{Read, Seek, Write};
use std::sync::Arc;

use crate::{JsonMockError, JsonMockResult};

use super::file_path::FilePath;
use super::http::{HttpServerConfig, HttpServerHandle, HttpService};

/// Trait combining Read + Seek for file handles.
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Platform Abstraction Layer trait providing filesystem and HTTP operations.
///
/// Two implementations are provided:
/// - `RealPal`: std::fs rooted at a base directory, tiny_http for serving
/// - `MockPal`: in-memory implementation for testing
pub trait Pal: std::fmt::Debug + Send + Sync + 'static {
    /// Check if a file exists at the given path.
    fn file_exists(&self, path: &FilePath) -> JsonMockResult<bool>;

    /// Open a file for reading.
    fn read_file(&self, path: &FilePath) -> JsonMockResult<Box<dyn ReadSeek + 'static>>;

    /// Read entire file contents as a UTF-8 string.
    fn read_file_to_string(&self, path: &FilePath) -> JsonMockResult<String> {
        let mut reader = self.read_file(path)?;
        let mut contents = Vec::new();
        reader
            .read_to_end(&mut contents)
            .map_err(|e| Box::new(JsonMockError::file_error(path.as_path(), e)))?;
        String::from_utf8(contents).map_err(|_e| crate::err!("File is not valid UTF-8: {}", path))
    }

    /// Create a new file, truncating it if it exists.
    fn create_file(&self, path: &FilePath) -> JsonMockResult<Box<dyn Write>>;

    /// Replace the whole content of a file.
    fn write_file(&self, path: &FilePath, contents: &[u8]) -> JsonMockResult<()> {
        let mut writer = self.create_file(path)?;
        writer
            .write_all(contents)
            .and_then(|()| writer.flush())
            .map_err(|e| Box::new(JsonMockError::file_error(path.as_path(), e)))
    }

    /// Start an HTTP server that dispatches every request to `service`.
    ///
    /// The server runs until the returned handle is shut down or dropped.
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> JsonMockResult<HttpServerHandle>;
}

/// Handle to a PAL implementation, enabling shared ownership.
///
/// ```no_run
/// use jsonmock_base::{RealPal, PalHandle};
///
/// let pal = PalHandle::new(RealPal::new(".".into()));
/// let pal_clone = pal.clone();
/// ```
#[derive(Debug, Clone)]
pub struct PalHandle(Arc<dyn Pal>);

impl PalHandle {
    /// Create a new PalHandle from a Pal implementation.
    pub fn new(pal: impl Pal + 'static) -> Self {
        Self(Arc::new(pal))
    }
}

impl std::ops::Deref for PalHandle {
    type Target = dyn Pal;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}
