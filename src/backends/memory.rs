//! In-process cache backend with tagged entries.
//!
//! ```rust
//! use cache_coordinator::backends::{CacheBackend, MemoryBackend};
//! use cache_coordinator::models::TagSet;
//!
//! # tokio_test::block_on(async {
//! let runtime = MemoryBackend::new("runtime");
//! runtime.insert("home", "<html>", TagSet::new(["pages"]));
//! runtime.insert("settings", "{}", TagSet::new(["system"]));
//!
//! runtime.flush_by_tags(&TagSet::new(["pages"])).await.unwrap();
//! assert!(!runtime.contains("home"));
//! assert!(runtime.contains("settings"));
//! # });
//! ```

use super::errors::BackendResult;
use super::traits::CacheBackend;
use crate::models::{Capabilities, StorageMedium, TagSet};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    tags: TagSet,
}

#[derive(Debug, Clone)]
pub struct MemoryBackend {
    name: String,
    entries: Arc<DashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            name: name.into(),
            entries: Arc::new(DashMap::new()),
        }
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&self, key: K, value: V, tags: TagSet) {
        self.entries.insert(
            key.into(),
            MemoryEntry {
                value: value.into(),
                tags,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::flush_only().with_flush_by_tag()
    }

    fn storage(&self) -> StorageMedium {
        StorageMedium::Process
    }

    async fn flush_all(&self) -> BackendResult<()> {
        self.entries.clear();
        Ok(())
    }

    async fn flush_by_tags(&self, tags: &TagSet) -> BackendResult<()> {
        self.entries
            .retain(|_, entry| !entry.tags.iter().any(|tag| tags.contains(tag)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flush_by_tags_only_drops_tagged_entries() {
        let backend = MemoryBackend::new("runtime");
        backend.insert("page:1", "<html>", TagSet::new(["pages"]));
        backend.insert("sys:1", "config", TagSet::new(["system"]));
        backend.insert("untagged", "v", TagSet::default());

        backend
            .flush_by_tags(&TagSet::new(["pages"]))
            .await
            .unwrap();

        assert!(!backend.contains("page:1"));
        assert_eq!(backend.get("sys:1").as_deref(), Some("config"));
        assert!(backend.contains("untagged"));
    }

    #[tokio::test]
    async fn test_flush_all_clears_everything() {
        let backend = MemoryBackend::new("runtime");
        backend.insert("a", "1", TagSet::new(["pages"]));
        backend.insert("b", "2", TagSet::default());

        backend.flush_all().await.unwrap();
        assert!(backend.is_empty());
        assert_eq!(backend.storage(), StorageMedium::Process);
    }
}
