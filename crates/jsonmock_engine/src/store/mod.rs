pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::InMemoryStore;
pub use traits::{DocumentStore, StoreHandle};
