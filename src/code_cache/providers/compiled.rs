//! Compiled artifact cache
//!
//! Keeps compiled artifacts keyed by the absolute path of their source file,
//! shared across clones through a `DashMap`.

use crate::code_cache::traits::CodeCache;
use crate::storage::StorageResult;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArtifact {
    pub size_bytes: usize,
    pub compiled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CompiledCodeCache {
    artifacts: Arc<DashMap<PathBuf, CompiledArtifact>>,
}

impl CompiledCodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the artifact compiled from `path`, replacing any previous one
    pub fn store<P: Into<PathBuf>>(&self, path: P, compiled: &[u8]) {
        self.artifacts.insert(
            path.into(),
            CompiledArtifact {
                size_bytes: compiled.len(),
                compiled_at: Utc::now(),
            },
        );
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.artifacts.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<CompiledArtifact> {
        self.artifacts.get(path).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl CodeCache for CompiledCodeCache {
    async fn clear_all(&self) -> StorageResult<usize> {
        let cleared = self.artifacts.len();
        self.artifacts.clear();
        Ok(cleared)
    }

    async fn clear_file(&self, path: &Path) -> StorageResult<bool> {
        Ok(self.artifacts.remove(path).is_some())
    }

    fn provider_name(&self) -> &'static str {
        "compiled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clear_file_removes_single_artifact() {
        let cache = CompiledCodeCache::new();
        cache.store("/srv/app/a.tpl", b"compiled-a");
        cache.store("/srv/app/b.tpl", b"compiled-b");

        assert!(cache.clear_file(Path::new("/srv/app/a.tpl")).await.unwrap());
        assert!(!cache.clear_file(Path::new("/srv/app/a.tpl")).await.unwrap());
        assert!(cache.contains(Path::new("/srv/app/b.tpl")));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_all_reports_count() {
        let cache = CompiledCodeCache::new();
        cache.store("/srv/app/a.tpl", b"a");
        cache.store("/srv/app/b.tpl", b"bb");

        assert_eq!(cache.clear_all().await.unwrap(), 2);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_artifacts() {
        let cache = CompiledCodeCache::new();
        let shared = cache.clone();
        cache.store("/srv/app/a.tpl", b"abc");

        assert_eq!(shared.get(Path::new("/srv/app/a.tpl")).unwrap().size_bytes, 3);
    }
}
