//! # Cache Backends
//!
//! ```text
//! CacheBackend (trait, Arc<dyn> in the registry)
//!   ├── FileBackend      <- entries below a root directory, optional tag partitions
//!   ├── DatabaseBackend  <- entries + tags tables behind a RelationalStore
//!   └── MemoryBackend    <- in-process tagged entries
//! ```
//!
//! Backends only implement the normal flush API. The hard reset never calls
//! into them.

pub mod database;
pub mod errors;
pub mod file;
pub mod memory;
pub mod traits;

pub use database::DatabaseBackend;
pub use errors::{BackendError, BackendResult};
pub use file::{FileBackend, FileLayout};
pub use memory::MemoryBackend;
pub use traits::CacheBackend;
