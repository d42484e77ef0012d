//! Code cache provider selected once at startup
//!
//! Enum dispatch instead of a trait object: the concrete implementation is fixed
//! by configuration and never re-decided per call.

use super::providers::{CompiledCodeCache, NoOpCodeCache};
use super::traits::CodeCache;
use crate::config::{CodeCacheConfig, CodeCacheKind};
use crate::storage::StorageResult;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub enum CodeCacheProvider {
    Compiled(CompiledCodeCache),
    NoOp(NoOpCodeCache),
}

impl CodeCacheProvider {
    pub fn from_config(config: &CodeCacheConfig) -> Self {
        let provider = match config.provider {
            CodeCacheKind::Compiled => Self::Compiled(CompiledCodeCache::new()),
            CodeCacheKind::Noop => Self::NoOp(NoOpCodeCache::new()),
        };
        info!(
            provider = provider.provider_name(),
            "Code cache provider selected"
        );
        provider
    }

    pub fn noop() -> Self {
        Self::NoOp(NoOpCodeCache::new())
    }

    /// The compiled artifact cache, for hosts that populate it
    pub fn compiled(&self) -> Option<&CompiledCodeCache> {
        match self {
            Self::Compiled(cache) => Some(cache),
            Self::NoOp(_) => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::NoOp(_))
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::Compiled(s) => s.provider_name(),
            Self::NoOp(s) => s.provider_name(),
        }
    }

    pub async fn clear_all(&self) -> StorageResult<usize> {
        match self {
            Self::Compiled(s) => s.clear_all().await,
            Self::NoOp(s) => s.clear_all().await,
        }
    }

    pub async fn clear_file(&self, path: &Path) -> StorageResult<bool> {
        match self {
            Self::Compiled(s) => s.clear_file(path).await,
            Self::NoOp(s) => s.clear_file(path).await,
        }
    }
}

impl From<CompiledCodeCache> for CodeCacheProvider {
    fn from(cache: CompiledCodeCache) -> Self {
        Self::Compiled(cache)
    }
}
