/* 📖 # What is the Platform Abstraction Layer?

Every file read, file write and listening socket goes through the `Pal` trait.
RealPal is backed by std::fs and tiny_http; MockPal keeps files in memory and
dispatches HTTP requests straight to the registered service. The engine is
written against `PalHandle` only.
*/

mod file_path;
pub mod http;
pub mod mock;
pub mod real_pal;
mod traits;

pub use file_path::FilePath;
pub use mock::MockPal;
pub use real_pal::RealPal;
pub use traits::{Pal, PalHandle, ReadSeek};
