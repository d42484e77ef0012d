//! Relational storage collaborator.

use super::errors::{StorageError, StorageResult};
use crate::models::TagSet;
use async_trait::async_trait;
use std::fmt;

const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Table enumeration, truncation and tag-based deletion
#[async_trait]
pub trait RelationalStore: Send + Sync + fmt::Debug {
    /// Tables in the active schema, sorted by name
    async fn list_tables(&self) -> StorageResult<Vec<String>>;

    async fn truncate(&self, table: &str) -> StorageResult<()>;

    /// Remove every entry carrying one of `tags` together with its tag rows.
    /// Returns the number of entries removed.
    async fn delete_tagged(
        &self,
        entries_table: &str,
        tags_table: &str,
        tags: &TagSet,
    ) -> StorageResult<u64>;

    fn driver_name(&self) -> &'static str;
}

/// Quote a table name for interpolation into SQL.
///
/// Only `[A-Za-z_][A-Za-z0-9_]*` names are accepted, so quoting never has to
/// escape anything.
pub fn quote_identifier(name: &str) -> StorageResult<String> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid_start || !valid_rest || name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(StorageError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{name}\""))
}

/// Whether `table` follows one of the cache table naming conventions
pub fn is_cache_table(table: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| table.starts_with(prefix.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_accepts_plain_names() {
        assert_eq!(quote_identifier("cf_pages").unwrap(), "\"cf_pages\"");
        assert_eq!(quote_identifier("_tmp1").unwrap(), "\"_tmp1\"");
    }

    #[test]
    fn test_quote_identifier_rejects_injection() {
        for bad in ["", "1table", "cf_pages; DROP TABLE users", "a\"b", "cf-pages"] {
            assert!(
                matches!(quote_identifier(bad), Err(StorageError::InvalidIdentifier(_))),
                "{bad} should be rejected"
            );
        }
        assert!(quote_identifier(&"a".repeat(64)).is_err());
    }

    #[test]
    fn test_cache_table_prefixes() {
        let prefixes = vec!["cf_".to_string(), "cache_".to_string()];
        assert!(is_cache_table("cf_pages", &prefixes));
        assert!(is_cache_table("cache_hash", &prefixes));
        assert!(!is_cache_table("users", &prefixes));
        assert!(!is_cache_table("my_cf_table", &prefixes));
    }
}
