//! No-op code cache provider
//!
//! Always succeeds and never holds anything. Used when the host runs without
//! an in-process code cache.

use crate::code_cache::traits::CodeCache;
use crate::storage::StorageResult;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct NoOpCodeCache;

impl NoOpCodeCache {
    pub fn new() -> Self {
        Self
    }
}

impl CodeCache for NoOpCodeCache {
    async fn clear_all(&self) -> StorageResult<usize> {
        Ok(0)
    }

    async fn clear_file(&self, _path: &Path) -> StorageResult<bool> {
        Ok(false)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_clear_all_returns_zero() {
        assert_eq!(NoOpCodeCache::new().clear_all().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_noop_clear_file_returns_false() {
        let svc = NoOpCodeCache::new();
        assert!(!svc.clear_file(Path::new("/srv/a.tpl")).await.unwrap());
        assert_eq!(svc.provider_name(), "noop");
    }
}
