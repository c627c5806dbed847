use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{JsonMockError, JsonMockResult};

use super::FilePath;
use super::http::{HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService};
use super::traits::{Pal, ReadSeek};

/// In-memory PAL implementation for testing.
///
/// Files live in a HashMap, and HTTP servers are registered per port so tests
/// can drive them with [`MockPal::simulate_request`].
///
/// ```
/// use jsonmock_base::{MockPal, Pal, FilePath};
///
/// let mock = MockPal::new();
/// mock.add_file(FilePath::from("db.json"), b"{}".to_vec());
/// let content = mock.read_file_to_string(&FilePath::from("db.json")).unwrap();
/// assert_eq!(content, "{}");
/// ```
#[derive(Debug, Clone)]
pub struct MockPal {
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    read_only: Arc<Mutex<HashSet<FilePath>>>,
    http_servers: Arc<Mutex<HashMap<u16, Box<dyn HttpService>>>>,
    next_port: Arc<AtomicU16>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockPal {
    /// Create a new empty MockPal.
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            read_only: Arc::new(Mutex::new(HashSet::new())),
            http_servers: Arc::new(Mutex::new(HashMap::new())),
            next_port: Arc::new(AtomicU16::new(10000)),
        }
    }

    /// Add a file to the mock storage.
    pub fn add_file(&self, path: FilePath, content: Vec<u8>) {
        lock(&self.files).insert(path, content);
    }

    /// Current content of a file as a string, if present and valid UTF-8.
    pub fn file_content(&self, path: &FilePath) -> Option<String> {
        lock(&self.files)
            .get(path)
            .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
    }

    /// Make `create_file` fail for the given path, simulating a read-only file.
    pub fn set_read_only(&self, path: FilePath) {
        lock(&self.read_only).insert(path);
    }

    /// Dispatch a request to the service registered on `port`.
    pub fn simulate_request(&self, port: u16, request: HttpRequest) -> JsonMockResult<HttpResponse> {
        let servers = lock(&self.http_servers);
        let service = servers
            .get(&port)
            .ok_or_else(|| crate::err!("No HTTP server registered on port {}", port))?;
        service.handle_request(request)
    }

    /// Get the number of registered HTTP servers.
    pub fn http_server_count(&self) -> usize {
        lock(&self.http_servers).len()
    }
}

impl Default for MockPal {
    fn default() -> Self {
        Self::new()
    }
}

impl Pal for MockPal {
    fn file_exists(&self, path: &FilePath) -> JsonMockResult<bool> {
        Ok(lock(&self.files).contains_key(path))
    }

    fn read_file(&self, path: &FilePath) -> JsonMockResult<Box<dyn ReadSeek + 'static>> {
        let content = lock(&self.files).get(path).cloned().ok_or_else(|| {
            Box::new(JsonMockError::file_error(
                path.as_path(),
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ),
            ))
        })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn create_file(&self, path: &FilePath) -> JsonMockResult<Box<dyn Write>> {
        if lock(&self.read_only).contains(path) {
            return Err(Box::new(JsonMockError::file_error(
                path.as_path(),
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only file"),
            )));
        }
        // Content lands in the map when the writer is dropped
        Ok(Box::new(MockFileWriter {
            path: path.clone(),
            files: Arc::clone(&self.files),
            buffer: Vec::new(),
        }))
    }

    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> JsonMockResult<HttpServerHandle> {
        let port = match config.port {
            Some(p) => p,
            None => self.next_port.fetch_add(1, Ordering::SeqCst),
        };
        lock(&self.http_servers).insert(port, service);
        Ok(HttpServerHandle::new(port))
    }
}

/// Writer that stores its buffer into MockPal when dropped.
struct MockFileWriter {
    path: FilePath,
    files: Arc<Mutex<HashMap<FilePath, Vec<u8>>>>,
    buffer: Vec<u8>,
}

impl Write for MockFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for MockFileWriter {
    fn drop(&mut self) {
        lock(&self.files).insert(self.path.clone(), std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pal::http::{HttpMethod, HttpStatusCode};

    #[test]
    fn test_file_exists() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("db.json"), b"{}".to_vec());

        assert!(pal.file_exists(&FilePath::from("db.json")).unwrap());
        assert!(!pal.file_exists(&FilePath::from("other.json")).unwrap());
    }

    #[test]
    fn test_read_file_not_found() {
        let pal = MockPal::new();
        assert!(pal.read_file(&FilePath::from("missing.json")).is_err());
    }

    #[test]
    fn test_write_file_then_read() {
        let pal = MockPal::new();
        pal.write_file(&FilePath::from("db.json"), br#"{"items":[]}"#)
            .unwrap();

        assert_eq!(
            pal.file_content(&FilePath::from("db.json")),
            Some(r#"{"items":[]}"#.to_string())
        );
    }

    #[test]
    fn test_read_only_file_rejects_writes() {
        let pal = MockPal::new();
        pal.add_file(FilePath::from("db.json"), b"{}".to_vec());
        pal.set_read_only(FilePath::from("db.json"));

        assert!(pal.write_file(&FilePath::from("db.json"), b"[]").is_err());
        assert_eq!(pal.file_content(&FilePath::from("db.json")), Some("{}".into()));
    }

    #[derive(Debug)]
    struct PathService;

    impl HttpService for PathService {
        fn handle_request(&self, request: HttpRequest) -> JsonMockResult<HttpResponse> {
            match request.path() {
                "/items" => Ok(HttpResponse::text("items")),
                _ => Ok(HttpResponse::not_found()),
            }
        }
    }

    #[test]
    fn test_start_http_server_assigns_port() {
        let pal = MockPal::new();
        let handle = pal
            .start_http_server(Box::new(PathService), HttpServerConfig::new("127.0.0.1"))
            .unwrap();
        assert!(handle.port() >= 10000);
        assert_eq!(pal.http_server_count(), 1);
    }

    #[test]
    fn test_simulate_request() {
        let pal = MockPal::new();
        let config = HttpServerConfig::new("127.0.0.1").with_port(8080);
        pal.start_http_server(Box::new(PathService), config).unwrap();

        let response = pal
            .simulate_request(8080, HttpRequest::new(HttpMethod::Get, "/items"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::Ok);

        let response = pal
            .simulate_request(8080, HttpRequest::new(HttpMethod::Get, "/other"))
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::NotFound);
    }

    #[test]
    fn test_simulate_request_invalid_port() {
        let pal = MockPal::new();
        let request = HttpRequest::new(HttpMethod::Get, "/items");
        assert!(pal.simulate_request(9999, request).is_err());
    }
}
