//! Code cache provider implementations

pub mod compiled;
pub mod noop;

pub use compiled::{CompiledArtifact, CompiledCodeCache};
pub use noop::NoOpCodeCache;
