//! Filesystem collaborator.
//!
//! All calls are blocking; async callers run them on `spawn_blocking`.

use super::errors::{StorageError, StorageResult};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory listing, best-effort recursive delete and writability checks
pub trait Filesystem: Send + Sync + fmt::Debug {
    fn exists(&self, path: &Path) -> bool;

    /// Immediate children of `path`
    fn list_dir(&self, path: &Path) -> StorageResult<Vec<PathBuf>>;

    /// Remove `path` and everything below it, continuing past failures
    fn remove_all(&self, path: &Path) -> RemovalReport;

    /// Create an empty file, creating parent directories as needed
    fn touch(&self, path: &Path) -> StorageResult<()>;

    /// Every entry at or below `root` that cannot be written.
    /// A missing root has no entries.
    fn unwritable_entries(&self, root: &Path) -> StorageResult<Vec<PathBuf>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: usize,
    pub failures: Vec<RemovalFailure>,
}

impl RemovalReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: RemovalReport) {
        self.removed += other.removed;
        self.failures.extend(other.failures);
    }

    fn fail(&mut self, path: PathBuf, error: impl fmt::Display) {
        self.failures.push(RemovalFailure {
            path,
            error: error.to_string(),
        });
    }

    fn has_failure_below(&self, dir: &Path) -> bool {
        self.failures
            .iter()
            .any(|failure| failure.path != dir && failure.path.starts_with(dir))
    }
}

/// `std::fs` backed implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn list_dir(&self, path: &Path) -> StorageResult<Vec<PathBuf>> {
        let entries = fs::read_dir(path).map_err(|e| StorageError::io(path, e))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StorageError::io(path, e))?;
            children.push(entry.path());
        }
        children.sort();
        Ok(children)
    }

    fn remove_all(&self, path: &Path) -> RemovalReport {
        let mut report = RemovalReport::default();

        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return report,
            Err(e) => {
                report.fail(path.to_path_buf(), e);
                return report;
            }
        };

        if !metadata.is_dir() {
            match fs::remove_file(path) {
                Ok(()) => report.removed += 1,
                Err(e) => report.fail(path.to_path_buf(), e),
            }
            return report;
        }

        for entry in WalkDir::new(path).contents_first(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let failed_path = e.path().unwrap_or(path).to_path_buf();
                    report.fail(failed_path, e);
                    continue;
                }
            };

            let entry_path = entry.path();
            if entry.file_type().is_dir() {
                match fs::remove_dir(entry_path) {
                    Ok(()) => report.removed += 1,
                    // A directory left non-empty by a child failure is already accounted for
                    Err(_) if report.has_failure_below(entry_path) => {}
                    Err(e) => report.fail(entry_path.to_path_buf(), e),
                }
            } else {
                match fs::remove_file(entry_path) {
                    Ok(()) => report.removed += 1,
                    Err(e) => report.fail(entry_path.to_path_buf(), e),
                }
            }
        }

        report
    }

    fn touch(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map(|_| ())
            .map_err(|e| StorageError::io(path, e))
    }

    fn unwritable_entries(&self, root: &Path) -> StorageResult<Vec<PathBuf>> {
        if !self.exists(root) {
            return Ok(Vec::new());
        }

        let mut unwritable = Vec::new();
        for entry in WalkDir::new(root) {
            match entry {
                // A link is removed through its parent; its target is never touched
                Ok(entry) if entry.path_is_symlink() => {}
                Ok(entry) => {
                    if !is_writable(entry.path()) {
                        unwritable.push(entry.path().to_path_buf());
                    }
                }
                // Unreadable directories cannot be cleaned either
                Err(e) => unwritable.push(e.path().unwrap_or(root).to_path_buf()),
            }
        }
        Ok(unwritable)
    }
}

/// Whether the current process may write `path`, as the kernel decides it
#[cfg(unix)]
fn is_writable(path: &Path) -> bool {
    use nix::unistd::{access, AccessFlags};
    access(path, AccessFlags::W_OK).is_ok()
}

#[cfg(not(unix))]
fn is_writable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|metadata| !metadata.permissions().readonly())
        .unwrap_or(false)
}
