//! Filesystem-backed cache backend.
//!
//! Entries live below a single root directory owned by the backend. With the
//! tag-partitioned layout every first-level directory is named after a tag, so
//! flushing a tag removes that subtree.

use super::errors::{BackendError, BackendResult};
use super::traits::CacheBackend;
use crate::models::{Capabilities, StorageMedium, TagSet};
use crate::storage::{Filesystem, RemovalReport};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLayout {
    Flat,
    TagPartitioned,
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    name: String,
    root: PathBuf,
    layout: FileLayout,
    fs: Arc<dyn Filesystem>,
}

impl FileBackend {
    pub fn new<N: Into<String>, P: Into<PathBuf>>(name: N, root: P, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
            layout: FileLayout::Flat,
            fs,
        }
    }

    pub fn tag_partitioned<N: Into<String>, P: Into<PathBuf>>(
        name: N,
        root: P,
        fs: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            layout: FileLayout::TagPartitioned,
            ..Self::new(name, root, fs)
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> FileLayout {
        self.layout
    }

    /// Subtree holding entries for `tag`
    fn tag_directory(&self, tag: &str) -> BackendResult<PathBuf> {
        let mut components = Path::new(tag).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(tag)),
            _ => Err(BackendError::failure(
                &self.name,
                format!("tag '{tag}' is not a plain directory name"),
            )),
        }
    }

    /// Remove `paths` on the blocking pool; with `expand` each path is replaced
    /// by its children first
    async fn remove_paths(&self, paths: Vec<PathBuf>, expand: bool) -> BackendResult<RemovalReport> {
        let fs = Arc::clone(&self.fs);
        tokio::task::spawn_blocking(move || {
            let mut report = RemovalReport::default();
            for path in paths {
                if !expand {
                    report.merge(fs.remove_all(&path));
                    continue;
                }
                for child in fs.list_dir(&path)? {
                    report.merge(fs.remove_all(&child));
                }
            }
            Ok::<_, BackendError>(report)
        })
        .await
        .map_err(|e| BackendError::failure(&self.name, format!("removal task failed: {e}")))?
    }

    fn finish_removal(&self, report: RemovalReport) -> BackendResult<()> {
        debug!(
            backend = %self.name,
            removed = report.removed,
            failures = report.failures.len(),
            "File backend removal finished"
        );
        match report.failures.first() {
            None => Ok(()),
            Some(first) => Err(BackendError::failure(
                &self.name,
                format!(
                    "{} entries could not be removed, first {}: {}",
                    report.failures.len(),
                    first.path.display(),
                    first.error
                ),
            )),
        }
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        let capabilities = Capabilities::flush_only().with_writability_check();
        match self.layout {
            FileLayout::Flat => capabilities,
            FileLayout::TagPartitioned => capabilities.with_flush_by_tag(),
        }
    }

    fn storage(&self) -> StorageMedium {
        StorageMedium::Filesystem {
            root: self.root.clone(),
        }
    }

    async fn flush_all(&self) -> BackendResult<()> {
        if !self.fs.exists(&self.root) {
            debug!(backend = %self.name, root = %self.root.display(), "Cache root absent, nothing to flush");
            return Ok(());
        }
        let report = self.remove_paths(vec![self.root.clone()], true).await?;
        self.finish_removal(report)
    }

    async fn flush_by_tags(&self, tags: &TagSet) -> BackendResult<()> {
        if self.layout == FileLayout::Flat {
            return Err(BackendError::capability_unsupported(
                &self.name,
                crate::models::Capability::FlushByTag,
            ));
        }
        let directories = tags
            .iter()
            .map(|tag| self.tag_directory(tag))
            .collect::<BackendResult<Vec<_>>>()?;
        let report = self.remove_paths(directories, false).await?;
        self.finish_removal(report)
    }
}
