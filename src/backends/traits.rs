//! Cache backend trait definition

use super::errors::{BackendError, BackendResult};
use crate::models::{Capabilities, Capability, StorageMedium, TagSet};
use async_trait::async_trait;
use std::fmt;

/// A cache storage medium the coordinator can flush
///
/// Backends are registered once and shared as `Arc<dyn CacheBackend>`; their
/// name, capabilities and storage must not change after registration.
#[async_trait]
pub trait CacheBackend: Send + Sync + fmt::Debug {
    /// Unique registry key
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    fn storage(&self) -> StorageMedium;

    /// Remove every entry
    async fn flush_all(&self) -> BackendResult<()>;

    /// Remove entries carrying any of `tags`
    async fn flush_by_tags(&self, _tags: &TagSet) -> BackendResult<()> {
        Err(BackendError::capability_unsupported(
            self.name(),
            Capability::FlushByTag,
        ))
    }
}
