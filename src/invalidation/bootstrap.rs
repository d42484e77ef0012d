//! # Coordinator Bootstrap
//!
//! Builds a ready [`CacheCoordinator`] from configuration:
//!
//! - **Filesystem**: [`LocalFilesystem`]
//! - **Relational store**: a lazily connected [`PgRelationalStore`] when
//!   `database.url` is set, otherwise none
//! - **Code cache**: the provider selected by `code_cache.provider`
//! - **Backends**: every `backends[]` entry, registered in declaration order
//!
//! Hosts that already own their collaborators call
//! [`CoordinatorBootstrap::with_collaborators`] instead.

use super::coordinator::CacheCoordinator;
use crate::backends::{CacheBackend, DatabaseBackend, FileBackend, MemoryBackend};
use crate::code_cache::CodeCacheProvider;
#[cfg(not(feature = "postgres"))]
use crate::config::ConfigurationError;
use crate::config::{BackendConfig, ConfigManager, CoordinatorConfig};
use crate::constants::defaults;
use crate::error::{CoordinatorError, Result};
use crate::logging::log_error;
use crate::registry::BackendRegistry;
#[cfg(feature = "postgres")]
use crate::storage::PgRelationalStore;
use crate::storage::{Filesystem, LocalFilesystem, RelationalStore};
use std::sync::Arc;
use tracing::{info, warn};

pub struct CoordinatorBootstrap;

impl CoordinatorBootstrap {
    /// Bootstrap from a loaded configuration manager
    pub fn from_config_manager(manager: &ConfigManager) -> Result<CacheCoordinator> {
        info!(
            environment = manager.environment(),
            "🚀 BOOTSTRAP: Building cache coordinator"
        );
        Self::from_config(manager.config())
    }

    /// Bootstrap from configuration, building every collaborator
    ///
    /// Call from within a tokio runtime when `database.url` is set.
    pub fn from_config(config: &CoordinatorConfig) -> Result<CacheCoordinator> {
        config.validate()?;

        let fs: Arc<dyn Filesystem> = Arc::new(LocalFilesystem::new());
        let store = match &config.database.url {
            Some(_) => Some(Self::connect_store(config)?),
            None => None,
        };
        let code_cache = CodeCacheProvider::from_config(&config.code_cache);

        Self::with_collaborators(config, fs, store, code_cache)
    }

    /// Register the configured backends on top of injected collaborators
    pub fn with_collaborators(
        config: &CoordinatorConfig,
        fs: Arc<dyn Filesystem>,
        store: Option<Arc<dyn RelationalStore>>,
        code_cache: CodeCacheProvider,
    ) -> Result<CacheCoordinator> {
        let registry = Arc::new(BackendRegistry::new());
        for backend_config in &config.backends {
            let backend = Self::build_backend(backend_config, &fs, store.as_ref())?;
            registry.register(backend)?;
        }

        if registry.is_empty() {
            warn!("No cache backends configured; only the hard reset and code cache paths have effect");
        }

        info!(
            backends = ?registry.names(),
            relational_store = store.as_ref().map(|s| s.driver_name()),
            code_cache = code_cache.provider_name(),
            "✅ BOOTSTRAP: Cache coordinator ready"
        );

        Ok(CacheCoordinator::new(config, registry, fs, store, code_cache))
    }

    #[cfg(feature = "postgres")]
    fn connect_store(config: &CoordinatorConfig) -> Result<Arc<dyn RelationalStore>> {
        let store = PgRelationalStore::connect_lazy(&config.database).map_err(|e| {
            log_error("bootstrap", "connect_database", &e.to_string(), None);
            CoordinatorError::StorageDriver(e.to_string())
        })?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "postgres"))]
    fn connect_store(_config: &CoordinatorConfig) -> Result<Arc<dyn RelationalStore>> {
        Err(ConfigurationError::validation_error(
            "database.url is set but the crate was built without the postgres feature",
        )
        .into())
    }

    fn build_backend(
        config: &BackendConfig,
        fs: &Arc<dyn Filesystem>,
        store: Option<&Arc<dyn RelationalStore>>,
    ) -> Result<Arc<dyn CacheBackend>> {
        let backend: Arc<dyn CacheBackend> = match config {
            BackendConfig::File {
                name,
                root,
                tag_partitioned,
            } => {
                if *tag_partitioned {
                    Arc::new(FileBackend::tag_partitioned(name, root, Arc::clone(fs)))
                } else {
                    Arc::new(FileBackend::new(name, root, Arc::clone(fs)))
                }
            }
            BackendConfig::Database {
                name,
                entries_table,
                tags_table,
            } => {
                let store = store.ok_or_else(|| {
                    CoordinatorError::InvalidBackend(format!(
                        "database backend '{name}' requires a relational store"
                    ))
                })?;
                let entries = entries_table
                    .clone()
                    .unwrap_or_else(|| format!("{}{name}", defaults::CACHE_TABLE_PREFIX));
                let tags = tags_table
                    .clone()
                    .unwrap_or_else(|| format!("{entries}{}", defaults::TAGS_TABLE_SUFFIX));
                Arc::new(DatabaseBackend::new(name, entries, tags, Arc::clone(store)))
            }
            BackendConfig::Memory { name } => Arc::new(MemoryBackend::new(name)),
        };
        Ok(backend)
    }
}
