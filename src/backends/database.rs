//! Database-backed cache backend.
//!
//! Each backend owns an entries table and a tags table (`cf_<name>` and
//! `cf_<name>_tags` by convention).

use super::errors::{BackendError, BackendResult};
use super::traits::CacheBackend;
use crate::constants::defaults;
use crate::models::{Capabilities, StorageMedium, TagSet};
use crate::storage::RelationalStore;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct DatabaseBackend {
    name: String,
    entries_table: String,
    tags_table: String,
    store: Arc<dyn RelationalStore>,
}

impl DatabaseBackend {
    pub fn new<N, E, T>(name: N, entries_table: E, tags_table: T, store: Arc<dyn RelationalStore>) -> Self
    where
        N: Into<String>,
        E: Into<String>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            entries_table: entries_table.into(),
            tags_table: tags_table.into(),
            store,
        }
    }

    /// Backend using the `cf_<name>` / `cf_<name>_tags` table convention
    pub fn conventional<N: Into<String>>(name: N, store: Arc<dyn RelationalStore>) -> Self {
        let name = name.into();
        let entries_table = format!("{}{}", defaults::CACHE_TABLE_PREFIX, name);
        let tags_table = format!("{entries_table}{}", defaults::TAGS_TABLE_SUFFIX);
        Self::new(name, entries_table, tags_table, store)
    }

    pub fn entries_table(&self) -> &str {
        &self.entries_table
    }

    pub fn tags_table(&self) -> &str {
        &self.tags_table
    }
}

#[async_trait]
impl CacheBackend for DatabaseBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::flush_only().with_flush_by_tag()
    }

    fn storage(&self) -> StorageMedium {
        StorageMedium::Database {
            tables: vec![self.entries_table.clone(), self.tags_table.clone()],
        }
    }

    async fn flush_all(&self) -> BackendResult<()> {
        // Attempt both tables even if the first fails
        let entries = self.store.truncate(&self.entries_table).await;
        let tags = self.store.truncate(&self.tags_table).await;

        match (entries, tags) {
            (Ok(()), Ok(())) => Ok(()),
            (Err(e), _) => Err(BackendError::failure(
                &self.name,
                format!("truncate {}: {e}", self.entries_table),
            )),
            (Ok(()), Err(e)) => Err(BackendError::failure(
                &self.name,
                format!("truncate {}: {e}", self.tags_table),
            )),
        }
    }

    async fn flush_by_tags(&self, tags: &TagSet) -> BackendResult<()> {
        let removed = self
            .store
            .delete_tagged(&self.entries_table, &self.tags_table, tags)
            .await?;
        debug!(
            backend = %self.name,
            tags = %tags,
            removed = removed,
            "Removed tagged entries"
        );
        Ok(())
    }
}
