/* 📖 # Why a separate base crate?
jsonmock_base holds everything that touches the outside world: the error type,
tracing setup and the platform abstraction layer (files and HTTP). The engine
only talks to these abstractions, so it can be tested against MockPal.
*/

pub mod error;
pub mod pal;
pub mod tracing;

// Re-export commonly used types for convenience
pub use error::{JsonMockError, JsonMockResult, ResultExt};
pub use pal::{FilePath, MockPal, Pal, PalHandle, RealPal};
