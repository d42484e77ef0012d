//! # In-Process Code Cache
//!
//! ```text
//! CodeCacheProvider (enum)            <- chosen from configuration at startup
//!   ├── Compiled(CompiledCodeCache)   <- DashMap of compiled artifacts by source path
//!   └── NoOp(NoOpCodeCache)           <- nothing cached, every clear succeeds
//! ```
//!
//! Cleared either completely or for a single source file through
//! `clear_opcode_cache`, and optionally by the hard reset.

pub mod provider;
pub mod providers;
pub mod traits;

pub use provider::CodeCacheProvider;
pub use providers::{CompiledArtifact, CompiledCodeCache, NoOpCodeCache};
pub use traits::CodeCache;
