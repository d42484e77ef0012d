//! # Registry Infrastructure
//!
//! The [`BackendRegistry`] is the single source of truth for which cache
//! backends exist. The planner reads it; the hard reset never consults it.

pub mod backend_registry;

pub use backend_registry::BackendRegistry;
