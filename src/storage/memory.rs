//! In-memory relational store.
//!
//! Used for embedding the coordinator without a database and for tests.
//! Individual tables can be marked as failing to exercise best-effort paths.

use super::errors::{StorageError, StorageResult};
use super::relational::RelationalStore;
use crate::models::TagSet;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoryRow {
    identifier: String,
    tag: Option<String>,
}

#[derive(Debug, Default)]
pub struct MemoryRelationalStore {
    tables: RwLock<BTreeMap<String, Vec<MemoryRow>>>,
    failing_tables: RwLock<HashSet<String>>,
}

impl MemoryRelationalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        for table in tables {
            store.create_table(table);
        }
        store
    }

    pub fn create_table<S: Into<String>>(&self, table: S) {
        self.tables.write().entry(table.into()).or_default();
    }

    pub fn insert_entry(&self, table: &str, identifier: &str) {
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(MemoryRow {
                identifier: identifier.to_string(),
                tag: None,
            });
    }

    pub fn insert_tag(&self, tags_table: &str, identifier: &str, tag: &str) {
        self.tables
            .write()
            .entry(tags_table.to_string())
            .or_default()
            .push(MemoryRow {
                identifier: identifier.to_string(),
                tag: Some(tag.to_string()),
            });
    }

    /// Rows in `table`, `None` when the table does not exist
    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.tables.read().get(table).map(Vec::len)
    }

    pub fn contains_entry(&self, table: &str, identifier: &str) -> bool {
        self.tables
            .read()
            .get(table)
            .map(|rows| rows.iter().any(|row| row.identifier == identifier))
            .unwrap_or(false)
    }

    /// Make every mutation of `table` fail
    pub fn fail_on<S: Into<String>>(&self, table: S) {
        self.failing_tables.write().insert(table.into());
    }

    fn check_writable(&self, table: &str) -> StorageResult<()> {
        if self.failing_tables.read().contains(table) {
            return Err(StorageError::driver(format!(
                "simulated failure on table {table}"
            )));
        }
        if !self.tables.read().contains_key(table) {
            return Err(StorageError::driver(format!(
                "relation \"{table}\" does not exist"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RelationalStore for MemoryRelationalStore {
    async fn list_tables(&self) -> StorageResult<Vec<String>> {
        Ok(self.tables.read().keys().cloned().collect())
    }

    async fn truncate(&self, table: &str) -> StorageResult<()> {
        self.check_writable(table)?;
        if let Some(rows) = self.tables.write().get_mut(table) {
            rows.clear();
        }
        Ok(())
    }

    async fn delete_tagged(
        &self,
        entries_table: &str,
        tags_table: &str,
        tags: &TagSet,
    ) -> StorageResult<u64> {
        self.check_writable(entries_table)?;
        self.check_writable(tags_table)?;

        let mut tables = self.tables.write();
        let tagged: HashSet<String> = tables
            .get(tags_table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.tag.as_deref().is_some_and(|tag| tags.contains(tag)))
                    .map(|row| row.identifier.clone())
                    .collect()
            })
            .unwrap_or_default();

        let mut removed = 0u64;
        if let Some(rows) = tables.get_mut(entries_table) {
            let before = rows.len();
            rows.retain(|row| !tagged.contains(&row.identifier));
            removed = (before - rows.len()) as u64;
        }
        if let Some(rows) = tables.get_mut(tags_table) {
            rows.retain(|row| !row.tag.as_deref().is_some_and(|tag| tags.contains(tag)));
        }

        Ok(removed)
    }

    fn driver_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_truncate_clears_rows() {
        let store = MemoryRelationalStore::with_tables(["cf_pages"]);
        store.insert_entry("cf_pages", "a");
        store.insert_entry("cf_pages", "b");

        store.truncate("cf_pages").await.unwrap();
        assert_eq!(store.row_count("cf_pages"), Some(0));
    }

    #[tokio::test]
    async fn test_truncate_unknown_table_fails() {
        let store = MemoryRelationalStore::new();
        assert!(store.truncate("cf_missing").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_tagged_removes_entries_and_tag_rows() {
        let store = MemoryRelationalStore::with_tables(["cf_hash", "cf_hash_tags"]);
        store.insert_entry("cf_hash", "one");
        store.insert_entry("cf_hash", "two");
        store.insert_entry("cf_hash", "three");
        store.insert_tag("cf_hash_tags", "one", "pages");
        store.insert_tag("cf_hash_tags", "two", "system");
        store.insert_tag("cf_hash_tags", "three", "pages");

        let removed = store
            .delete_tagged("cf_hash", "cf_hash_tags", &TagSet::new(["pages"]))
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert!(store.contains_entry("cf_hash", "two"));
        assert!(!store.contains_entry("cf_hash", "one"));
        assert_eq!(store.row_count("cf_hash_tags"), Some(1));
    }

    #[tokio::test]
    async fn test_failing_table() {
        let store = MemoryRelationalStore::with_tables(["cf_pages"]);
        store.fail_on("cf_pages");
        let error = store.truncate("cf_pages").await.unwrap_err();
        assert!(error.to_string().contains("simulated failure"));
        assert_eq!(store.list_tables().await.unwrap(), vec!["cf_pages"]);
    }
}
