//! # Coordinator Configuration
//!
//! Layered configuration for the cache coordinator: a base TOML file, an
//! environment overlay and `CACHE_COORDINATOR__*` environment variables, merged
//! by the `config` crate and validated before use.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cache_coordinator::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let pool = manager.config().executor.max_concurrent_operations;
//! let root = &manager.config().hard_reset.cache_root;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::auth::AccessRole;
use crate::constants::{defaults, groups};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring cache-coordinator.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Worker pool and per-operation limits
    pub executor: ExecutorConfig,

    /// Low-level wipe settings
    pub hard_reset: HardResetConfig,

    /// Relational storage connection
    pub database: DatabaseConfig,

    /// In-process compiled-code cache selection
    pub code_cache: CodeCacheConfig,

    /// Access token validation
    pub access: AccessConfig,

    /// Named cache groups used by the shortcut operations
    pub groups: CacheGroupsConfig,

    /// Backends registered at bootstrap, in registration order
    pub backends: Vec<BackendConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub max_concurrent_operations: usize,
    /// Upper bound for a single backend operation; unbounded when absent
    pub operation_timeout_ms: Option<u64>,
    pub writability_precheck: bool,
}

impl ExecutorConfig {
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_operations: defaults::MAX_CONCURRENT_OPERATIONS,
            operation_timeout_ms: None,
            writability_precheck: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HardResetConfig {
    pub cache_root: PathBuf,
    pub sentinel_file: String,
    pub table_prefixes: Vec<String>,
    pub include_code_cache: bool,
}

impl Default for HardResetConfig {
    fn default() -> Self {
        Self {
            cache_root: PathBuf::from(defaults::CACHE_ROOT),
            sentinel_file: defaults::SENTINEL_FILE.to_string(),
            table_prefixes: defaults::CACHE_TABLE_PREFIXES
                .iter()
                .map(|prefix| (*prefix).to_string())
                .collect(),
            include_code_cache: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: defaults::DATABASE_MAX_CONNECTIONS,
            acquire_timeout_seconds: defaults::DATABASE_ACQUIRE_TIMEOUT_SECONDS,
        }
    }
}

/// Which code-cache implementation to build at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeCacheKind {
    #[default]
    Compiled,
    Noop,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CodeCacheConfig {
    pub provider: CodeCacheKind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Principals allowed to clear caches; empty admits any principal
    pub allowed_principals: Vec<String>,
    pub required_role: AccessRole,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            allowed_principals: Vec::new(),
            required_role: AccessRole::Admin,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheGroupsConfig {
    /// Backends left alone by `clear_all_except_page_cache`
    pub page_cache_backends: Vec<String>,
}

impl Default for CacheGroupsConfig {
    fn default() -> Self {
        Self {
            page_cache_backends: groups::PAGE_CACHE_BACKENDS
                .iter()
                .map(|name| (*name).to_string())
                .collect(),
        }
    }
}

/// Backend declaration; `kind` selects the implementation
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    File {
        name: String,
        root: PathBuf,
        #[serde(default)]
        tag_partitioned: bool,
    },
    Database {
        name: String,
        entries_table: Option<String>,
        tags_table: Option<String>,
    },
    Memory {
        name: String,
    },
}

impl BackendConfig {
    pub fn name(&self) -> &str {
        match self {
            BackendConfig::File { name, .. }
            | BackendConfig::Database { name, .. }
            | BackendConfig::Memory { name } => name,
        }
    }
}

impl CoordinatorConfig {
    /// Validate cross-field constraints after loading
    pub fn validate(&self) -> ConfigResult<()> {
        if self.executor.max_concurrent_operations == 0 {
            return Err(ConfigurationError::invalid_value(
                "executor.max_concurrent_operations",
                "0",
                "pool size must be greater than 0",
            ));
        }

        if self.executor.operation_timeout_ms == Some(0) {
            return Err(ConfigurationError::invalid_value(
                "executor.operation_timeout_ms",
                "0",
                "omit the field to disable the timeout",
            ));
        }

        let sentinel = &self.hard_reset.sentinel_file;
        if sentinel.is_empty() || sentinel.contains('/') || sentinel.contains('\\') {
            return Err(ConfigurationError::invalid_value(
                "hard_reset.sentinel_file",
                sentinel.clone(),
                "must be a plain file name",
            ));
        }

        if self.hard_reset.table_prefixes.iter().any(String::is_empty) {
            return Err(ConfigurationError::invalid_value(
                "hard_reset.table_prefixes",
                "\"\"",
                "an empty prefix would match every table",
            ));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                "0",
                "pool size must be greater than 0",
            ));
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            let name = backend.name();
            if name.trim().is_empty() {
                return Err(ConfigurationError::missing_required_field(
                    "name",
                    "backends entry",
                ));
            }
            if !seen.insert(name) {
                return Err(ConfigurationError::invalid_value(
                    "backends.name",
                    name,
                    "backend names must be unique",
                ));
            }
            if matches!(backend, BackendConfig::Database { .. }) && self.database.url.is_none() {
                return Err(ConfigurationError::missing_required_field(
                    "database.url",
                    format!("database backend '{name}'"),
                ));
            }
        }

        Ok(())
    }
}
