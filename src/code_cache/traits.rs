//! Code cache trait definition

use crate::storage::StorageResult;
use std::path::Path;

/// Operations on an in-process compiled-code cache
///
/// Implemented by concrete providers (compiled artifact map, NoOp).
pub trait CodeCache: Send + Sync {
    /// Drop every cached artifact, returning how many were dropped
    fn clear_all(&self) -> impl std::future::Future<Output = StorageResult<usize>> + Send;

    /// Drop the artifact compiled from `path`; `Ok(false)` when none was cached
    fn clear_file(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = StorageResult<bool>> + Send;

    fn provider_name(&self) -> &'static str;
}
