//! # Storage Collaborators
//!
//! Abstractions the coordinator is handed at construction instead of reaching
//! for global state:
//!
//! ```text
//! Filesystem        <- directory listing, best-effort recursive delete, writability
//!   └── LocalFilesystem
//! RelationalStore   <- table enumeration, truncate, tag-based delete
//!   ├── PgRelationalStore      (sqlx PgPool)
//!   └── MemoryRelationalStore  (embedding and tests)
//! ```
//!
//! The in-process code cache lives in [`crate::code_cache`].

pub mod errors;
pub mod filesystem;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod relational;

pub use errors::{StorageError, StorageResult};
pub use filesystem::{Filesystem, LocalFilesystem, RemovalFailure, RemovalReport};
pub use memory::MemoryRelationalStore;
#[cfg(feature = "postgres")]
pub use postgres::PgRelationalStore;
pub use relational::{is_cache_table, quote_identifier, RelationalStore};
