//! Error types for the cache coordinator.
//!
//! Only boundary failures surface as [`CoordinatorError`]: authorization,
//! request validation, registry misconfiguration and bootstrap. Failures inside
//! a single backend's scope are captured in the
//! [`InvalidationResult`](crate::models::InvalidationResult) instead.

use crate::config::ConfigurationError;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("Backend '{name}' is already registered")]
    DuplicateBackend { name: String },

    #[error("Backend '{name}' not found")]
    BackendNotFound { name: String },

    #[error("Invalid backend: {0}")]
    InvalidBackend(String),

    #[error("Backend '{name}' overlaps storage of '{existing}' at {location}")]
    StorageConflict {
        name: String,
        existing: String,
        location: String,
    },

    #[error("Invalid invalidation request: {0}")]
    InvalidRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage driver error: {0}")]
    StorageDriver(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl CoordinatorError {
    pub fn duplicate_backend<N: Into<String>>(name: N) -> Self {
        Self::DuplicateBackend { name: name.into() }
    }

    pub fn backend_not_found<N: Into<String>>(name: N) -> Self {
        Self::BackendNotFound { name: name.into() }
    }

    pub fn filesystem_conflict<N: Into<String>, E: Into<String>>(
        name: N,
        existing: E,
        root: &Path,
    ) -> Self {
        Self::StorageConflict {
            name: name.into(),
            existing: existing.into(),
            location: root.display().to_string(),
        }
    }

    pub fn table_conflict<N: Into<String>, E: Into<String>, T: Into<String>>(
        name: N,
        existing: E,
        table: T,
    ) -> Self {
        Self::StorageConflict {
            name: name.into(),
            existing: existing.into(),
            location: format!("table {}", table.into()),
        }
    }

    pub fn invalid_request<M: Into<String>>(message: M) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub fn unauthorized<M: Into<String>>(message: M) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<sqlx::Error> for CoordinatorError {
    fn from(err: sqlx::Error) -> Self {
        CoordinatorError::StorageDriver(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoordinatorError>;
