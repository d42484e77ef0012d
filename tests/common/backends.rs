//! Test doubles for backends and storage

use async_trait::async_trait;
use cache_coordinator::backends::{BackendError, BackendResult, CacheBackend};
use cache_coordinator::models::{Capabilities, StorageMedium};
use cache_coordinator::storage::{
    Filesystem, LocalFilesystem, RemovalFailure, RemovalReport, StorageResult,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Backend whose flush always fails, counting attempts
#[derive(Debug)]
pub struct FailingBackend {
    name: String,
    attempts: AtomicUsize,
}

impl FailingBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for FailingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::flush_only()
    }

    fn storage(&self) -> StorageMedium {
        StorageMedium::Process
    }

    async fn flush_all(&self) -> BackendResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::failure(&self.name, "simulated backend outage"))
    }
}

/// Backend declaring no capabilities; `flush_all` still works
#[derive(Debug)]
pub struct UndeclaredBackend {
    name: String,
    flushes: AtomicUsize,
}

impl UndeclaredBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flushes: AtomicUsize::new(0),
        }
    }

    pub fn flushes(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheBackend for UndeclaredBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn storage(&self) -> StorageMedium {
        StorageMedium::Process
    }

    async fn flush_all(&self) -> BackendResult<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Backend that never finishes within a reasonable timeout
#[derive(Debug)]
pub struct StalledBackend {
    name: String,
}

impl StalledBackend {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl CacheBackend for StalledBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::flush_only()
    }

    fn storage(&self) -> StorageMedium {
        StorageMedium::Process
    }

    async fn flush_all(&self) -> BackendResult<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

/// Local filesystem with injected unwritable entries and removal failures
#[derive(Debug, Default)]
pub struct SimulatedFilesystem {
    inner: LocalFilesystem,
    unwritable: Vec<PathBuf>,
    undeletable: Vec<PathBuf>,
}

impl SimulatedFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `path` as unwritable during pre-checks
    pub fn with_unwritable(mut self, path: PathBuf) -> Self {
        self.unwritable.push(path);
        self
    }

    /// Refuse to remove `path`
    pub fn with_undeletable(mut self, path: PathBuf) -> Self {
        self.undeletable.push(path);
        self
    }
}

impl Filesystem for SimulatedFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn list_dir(&self, path: &Path) -> StorageResult<Vec<PathBuf>> {
        self.inner.list_dir(path)
    }

    fn remove_all(&self, path: &Path) -> RemovalReport {
        if self.undeletable.iter().any(|p| p == path) {
            return RemovalReport {
                removed: 0,
                failures: vec![RemovalFailure {
                    path: path.to_path_buf(),
                    error: "Permission denied (simulated)".to_string(),
                }],
            };
        }
        self.inner.remove_all(path)
    }

    fn touch(&self, path: &Path) -> StorageResult<()> {
        self.inner.touch(path)
    }

    fn unwritable_entries(&self, root: &Path) -> StorageResult<Vec<PathBuf>> {
        let mut entries = self.inner.unwritable_entries(root)?;
        entries.extend(
            self.unwritable
                .iter()
                .filter(|path| path.starts_with(root) && self.inner.exists(path))
                .cloned(),
        );
        Ok(entries)
    }
}
