#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Cache Coordinator
//!
//! Coordinates cache invalidation across heterogeneous cache backends:
//! filesystem entries, relational tables, in-process caches and an in-process
//! compiled-code cache.
//!
//! ## Overview
//!
//! Two paths clear caches:
//!
//! - **Normal flush**: the planner resolves registered backends, the executor
//!   calls each backend's own flush API on a bounded pool and records one
//!   outcome per backend. A failing backend never stops its siblings.
//! - **Hard reset**: when the backends cannot be trusted, storage is wiped
//!   directly. The cache root is emptied (keeping its sentinel file) and every
//!   table named like a cache table is truncated.
//!
//! ## Module Organization
//!
//! - [`backends`] - `CacheBackend` trait and the file, database and memory backends
//! - [`registry`] - Registered backends and storage-overlap checks
//! - [`invalidation`] - Planner, executor, hard reset, coordinator and bootstrap
//! - [`storage`] - Filesystem and relational storage collaborators
//! - [`code_cache`] - In-process compiled-code cache providers
//! - [`auth`] - Access tokens and policy
//! - [`config`] - Layered configuration
//! - [`models`] - Requests, tag sets, capabilities and results
//! - [`error`] - Boundary error handling
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cache_coordinator::auth::AccessToken;
//! use cache_coordinator::config::ConfigManager;
//! use cache_coordinator::invalidation::CoordinatorBootstrap;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! cache_coordinator::logging::init_structured_logging();
//!
//! let manager = ConfigManager::load()?;
//! let coordinator = CoordinatorBootstrap::from_config_manager(&manager)?;
//! let admin = coordinator.authorize(&AccessToken::admin("deploy"))?;
//!
//! let result = admin.clear_page_cache().await?;
//! for report in &result.reports {
//!     println!("{}: {}", report.backend, report.outcome);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backends;
pub mod code_cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod invalidation;
pub mod logging;
pub mod models;
pub mod registry;
pub mod storage;

pub use auth::{AccessPolicy, AccessRole, AccessToken};
pub use backends::{BackendError, CacheBackend, DatabaseBackend, FileBackend, MemoryBackend};
pub use config::{ConfigManager, CoordinatorConfig};
pub use error::{CoordinatorError, Result};
pub use invalidation::{AuthorizedCoordinator, CacheCoordinator, CoordinatorBootstrap};
pub use models::{
    Diagnostic, InvalidationMode, InvalidationRequest, InvalidationResult, Outcome, TagSet,
};
pub use registry::BackendRegistry;
