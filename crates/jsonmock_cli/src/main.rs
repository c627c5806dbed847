/* 📖 # What does the jsonmock binary do?

    jsonmock -p 8080 -f db.json -u api.example.test

1. Load the data file. Its top-level keys become the endpoints.
2. Optionally register the fake hostname in the hosts file.
3. Serve the API until Ctrl-C, then remove the hostname again.

Exit codes:
- 0: server stopped by Ctrl-C
- 1: the data file could not be loaded, an endpoint key is invalid, the hosts
  file could not be updated, or the port could not be bound
*/

use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::mpsc;

use clap::Parser;
use jsonmock_base::pal::http::HttpServerConfig;
use jsonmock_base::tracing::init_tracing;
use jsonmock_base::{FilePath, JsonMockResult, PalHandle, RealPal, err};
use jsonmock_engine::config::{DEFAULT_DATA_FILE, DEFAULT_PORT};
use jsonmock_engine::{
    FileStore, HostAlias, MockApiService, RequestProcessor, ServerConfig, StoreHandle,
    WritePolicy, default_hosts_path,
};
use tracing::{error, info, warn};

/// Serve a mock REST API whose routes and data come from a JSON file.
#[derive(Debug, Parser)]
#[command(name = "jsonmock", version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// JSON file from which routes and data are read
    #[arg(short = 'f', long, default_value = DEFAULT_DATA_FILE)]
    config_file: String,

    /// Fake hostname mapped to 127.0.0.1 while the server runs
    #[arg(short, long)]
    url: Option<String>,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Reject POSTs whose parameter value already exists
    #[arg(long)]
    unique_params: bool,

    /// Hosts file to edit instead of the system one
    #[arg(long)]
    hosts_file: Option<PathBuf>,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            data_file: self.config_file.clone(),
            hostname: self.url.clone(),
            unique_params: self.unique_params,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = init_tracing("info") {
        eprintln!("Error: Failed to initialize logging: {}", e);
        process::exit(1);
    }

    let hosts_file = args.hosts_file.clone().unwrap_or_else(default_hosts_path);
    if let Err(e) = run(&args.server_config(), &hosts_file) {
        error!(error = ?e, "jsonmock stopped with an error");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(config: &ServerConfig, hosts_file: &Path) -> JsonMockResult<()> {
    let current_dir =
        env::current_dir().map_err(|e| err!("Failed to get current directory: {}", e))?;
    let (data_dir, data_file) = split_file_path(&current_dir, Path::new(&config.data_file))?;

    let pal = PalHandle::new(RealPal::new(data_dir));
    let store = FileStore::load(pal.clone(), data_file)?;
    let processor = RequestProcessor::new(StoreHandle::new(store))?.with_policy(WritePolicy {
        unique_params: config.unique_params,
    });

    let alias = match &config.hostname {
        Some(hostname) => {
            let alias = HostAlias::for_hosts_file(hosts_file, hostname.clone())?;
            alias.add()?;
            Some(alias)
        }
        None => None,
    };

    let served = serve(&pal, processor, config);

    if let Some(alias) = alias {
        if let Err(e) = alias.remove() {
            warn!(error = %e, "failed to remove host alias");
        }
    }
    served
}

fn serve(pal: &PalHandle, processor: RequestProcessor, config: &ServerConfig) -> JsonMockResult<()> {
    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })
    .map_err(|e| err!("Failed to install Ctrl-C handler: {}", e))?;

    let server_config = HttpServerConfig::new(config.host.as_str()).with_port(config.port);
    let handle = pal.start_http_server(Box::new(MockApiService::new(processor)), server_config)?;

    info!("Starting server");
    info!(port = handle.port(), "Listening for connections");
    info!(data_file = %config.data_file, "Routing and data are read from the data file");
    info!("Running at {}", config.display_url());

    // Blocks until Ctrl-C; a closed channel means the handler is gone
    let _ = stop_rx.recv();
    info!("Shutting down");
    handle.shutdown();
    Ok(())
}

/// Split `path` into the directory the PAL is rooted at and the file name.
fn split_file_path(current_dir: &Path, path: &Path) -> JsonMockResult<(PathBuf, FilePath)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| err!("Invalid data file path: {}", path.display()))?;
    let dir = current_dir.join(path.parent().unwrap_or_else(|| Path::new("")));
    Ok((dir, FilePath::from(file_name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["jsonmock"]).unwrap();
        let config = args.server_config();
        assert_eq!(config, ServerConfig::default());
        assert!(args.hosts_file.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "jsonmock",
            "-p",
            "8080",
            "-f",
            "data/mock.json",
            "-u",
            "api.test",
            "--host",
            "127.0.0.1",
            "--unique-params",
            "--hosts-file",
            "/tmp/hosts",
        ])
        .unwrap();

        let config = args.server_config();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_file, "data/mock.json");
        assert_eq!(config.hostname.as_deref(), Some("api.test"));
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.unique_params);
        assert_eq!(args.hosts_file, Some(PathBuf::from("/tmp/hosts")));
        assert_eq!(config.display_url(), "http://api.test:8080/");
    }

    #[test]
    fn test_rejects_invalid_port() {
        assert!(Args::try_parse_from(["jsonmock", "--port", "http"]).is_err());
    }

    #[test]
    fn test_split_file_path() {
        let (dir, file) = split_file_path(Path::new("/srv"), Path::new("db.json")).unwrap();
        assert_eq!(dir, PathBuf::from("/srv"));
        assert_eq!(file, FilePath::from("db.json"));

        let (dir, file) = split_file_path(Path::new("/srv"), Path::new("mocks/api.json")).unwrap();
        assert_eq!(dir, PathBuf::from("/srv/mocks"));
        assert_eq!(file, FilePath::from("api.json"));

        let (dir, _file) = split_file_path(Path::new("/srv"), Path::new("/data/db.json")).unwrap();
        assert_eq!(dir, PathBuf::from("/data"));

        assert!(split_file_path(Path::new("/srv"), Path::new("..")).is_err());
    }
}
