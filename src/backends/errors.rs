//! Backend error types
//!
//! Raised inside a single backend's scope. The executor converts every one of
//! them into an [`Outcome`](crate::models::Outcome) instead of propagating.

use crate::models::Capability;
use crate::storage::StorageError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// Found by the writability pre-check; logged, never fatal
    #[error("Storage not writable: {}", path.display())]
    UnwritableStorage { path: PathBuf },

    #[error("Backend '{backend}' failed: {reason}")]
    BackendFailure { backend: String, reason: String },

    #[error("Backend '{backend}' does not support {capability}")]
    CapabilityUnsupported {
        backend: String,
        capability: Capability,
    },

    #[error("Storage driver error: {0}")]
    StorageDriver(String),

    #[error("Operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    pub fn failure<B: Into<String>, R: Into<String>>(backend: B, reason: R) -> Self {
        Self::BackendFailure {
            backend: backend.into(),
            reason: reason.into(),
        }
    }

    pub fn capability_unsupported<B: Into<String>>(backend: B, capability: Capability) -> Self {
        Self::CapabilityUnsupported {
            backend: backend.into(),
            capability,
        }
    }
}

impl From<StorageError> for BackendError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::Io { path, source } => BackendError::Io { path, source },
            other => BackendError::StorageDriver(other.to_string()),
        }
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
