use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};

use crate::{JsonMockError, JsonMockResult};

use super::FilePath;
use super::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpServerConfig, HttpServerHandle, HttpService,
    HttpStatusCode,
};
use super::traits::{Pal, ReadSeek};

/// How long the accept loop waits before re-checking the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// PAL implementation using the real filesystem and tiny_http.
///
/// All file paths are resolved relative to a configured base directory.
#[derive(Debug)]
pub struct RealPal {
    base_dir: PathBuf,
}

impl RealPal {
    /// Create a new RealPal with the given base directory.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Resolve a FilePath to a filesystem path.
    fn resolve_path(&self, path: &FilePath) -> PathBuf {
        path.to_path(&self.base_dir)
    }
}

impl Pal for RealPal {
    #[instrument(skip(self), fields(path = %path))]
    fn file_exists(&self, path: &FilePath) -> JsonMockResult<bool> {
        let resolved = self.resolve_path(path);
        let exists = resolved.exists();
        debug!(exists, resolved = %resolved.display(), "checked file existence");
        Ok(exists)
    }

    #[instrument(skip(self), fields(path = %path))]
    fn read_file(&self, path: &FilePath) -> JsonMockResult<Box<dyn ReadSeek + 'static>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "opening file for reading");
        let file = fs::File::open(&resolved).map_err(|e| {
            debug!(error = %e, "failed to open file");
            Box::new(JsonMockError::file_error(resolved, e))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self), fields(path = %path))]
    fn create_file(&self, path: &FilePath) -> JsonMockResult<Box<dyn Write>> {
        let resolved = self.resolve_path(path);
        debug!(resolved = %resolved.display(), "creating file");
        let file = fs::File::create(&resolved).map_err(|e| {
            debug!(error = %e, "failed to create file");
            Box::new(JsonMockError::file_error(resolved, e))
        })?;
        Ok(Box::new(file))
    }

    #[instrument(skip(self, service), fields(address = %config.address()))]
    fn start_http_server(
        &self,
        service: Box<dyn HttpService>,
        config: HttpServerConfig,
    ) -> JsonMockResult<HttpServerHandle> {
        let server = tiny_http::Server::http(config.address()).map_err(|e| {
            crate::err!("Failed to bind HTTP server to {}: {}", config.address(), e)
        })?;
        let port = server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .ok_or_else(|| crate::err!("HTTP server is not bound to an IP address"))?;

        let handle = HttpServerHandle::new(port);
        let shutdown = Arc::clone(handle.shutdown_flag());
        let service: Arc<dyn HttpService> = Arc::from(service);
        let server_name = config.server_name.clone();

        std::thread::Builder::new()
            .name(format!("http-{}", port))
            .spawn(move || accept_loop(server, service, server_name, shutdown))
            .map_err(|e| crate::err!("Failed to spawn HTTP server thread: {}", e))?;

        info!(port, "HTTP server listening");
        Ok(handle)
    }
}

fn accept_loop(
    server: tiny_http::Server,
    service: Arc<dyn HttpService>,
    server_name: String,
    shutdown: Arc<AtomicBool>,
) {
    while !shutdown.load(Ordering::SeqCst) {
        let request = match server.recv_timeout(ACCEPT_POLL_INTERVAL) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "failed to accept HTTP request");
                continue;
            }
        };
        let service = Arc::clone(&service);
        let server_name = server_name.clone();
        let spawned = std::thread::Builder::new()
            .name("http-request".to_string())
            .spawn(move || serve_request(request, service.as_ref(), &server_name));
        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn request thread");
        }
    }
    info!("HTTP server stopped");
}

fn serve_request(mut request: tiny_http::Request, service: &dyn HttpService, server_name: &str) {
    let response = match to_http_request(&mut request) {
        Ok(http_request) => match service.handle_request(http_request) {
            Ok(response) => response,
            Err(e) => {
                error!(error = ?e, "service failed to handle request");
                HttpResponse::internal_error().with_body(e.to_string())
            }
        },
        Err(e) => unreadable_request_response(&e),
    };

    let status = response.status().as_u16();
    let mut headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    headers.push(("Server".to_string(), server_name.to_string()));

    let mut tiny_response =
        tiny_http::Response::from_data(response.into_body().into_bytes()).with_status_code(status);
    for (key, value) in headers {
        match tiny_http::Header::from_bytes(key.as_bytes(), value.as_bytes()) {
            Ok(header) => tiny_response.add_header(header),
            Err(()) => warn!(header = %key, "skipping invalid response header"),
        }
    }

    if let Err(e) = request.respond(tiny_response) {
        warn!(error = %e, "failed to write HTTP response");
    }
}

fn unreadable_request_response(error: &JsonMockError) -> HttpResponse {
    warn!(error = %error, "rejecting unreadable request");
    HttpResponse::new(HttpStatusCode::BadRequest).with_body(error.to_string())
}

fn to_http_request(request: &mut tiny_http::Request) -> JsonMockResult<HttpRequest> {
    let method = HttpMethod::parse(&request.method().to_string());
    let mut http_request = HttpRequest::new(method, request.url());
    for header in request.headers() {
        http_request = http_request.with_header(header.field.to_string(), header.value.to_string());
    }
    let mut body = Vec::new();
    request
        .as_reader()
        .read_to_end(&mut body)
        .map_err(|e| crate::err!("Failed to read request body: {}", e))?;
    Ok(http_request.with_body(body))
}
