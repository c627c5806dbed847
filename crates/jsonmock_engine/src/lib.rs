pub mod api;
pub mod config;
pub mod document;
pub mod hosts;
pub mod processor;
pub mod registry;
pub mod router;
pub mod store;

pub use api::MockApiService;
pub use config::ServerConfig;
pub use document::Document;
pub use hosts::{HostAlias, default_hosts_path};
pub use processor::{RequestError, RequestProcessor, WritePolicy};
pub use registry::{EndpointDeclaration, EndpointRegistry};
pub use router::{RouteMatch, Router};
pub use store::{DocumentStore, FileStore, InMemoryStore, StoreHandle};
