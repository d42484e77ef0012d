//! Storage collaborator error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by filesystem, relational and code-cache collaborators
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Storage driver error: {0}")]
    Driver(String),

    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),
}

impl StorageError {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn driver<M: Into<String>>(message: M) -> Self {
        Self::Driver(message.into())
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        StorageError::Driver(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
