//! # Backend Registry
//!
//! Holds registered cache backends in registration order.
//!
//! ## Invariants
//!
//! - Every backend name is registered exactly once.
//! - No two backends share a storage location: nested filesystem roots or a
//!   shared table are rejected at registration.
//! - Backends are never replaced or removed once registered.
//!
//! ## Usage
//!
//! ```rust
//! use cache_coordinator::backends::MemoryBackend;
//! use cache_coordinator::registry::BackendRegistry;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = BackendRegistry::new();
//! registry.register(Arc::new(MemoryBackend::new("runtime")))?;
//!
//! assert_eq!(registry.names(), vec!["runtime"]);
//! assert!(registry.find("runtime").is_ok());
//! # Ok(())
//! # }
//! ```

use crate::backends::CacheBackend;
use crate::error::{CoordinatorError, Result};
use crate::logging::log_registry_operation;
use crate::models::StorageMedium;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct BackendRegistry {
    backends: RwLock<Vec<Arc<dyn CacheBackend>>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own name
    pub fn register(&self, backend: Arc<dyn CacheBackend>) -> Result<()> {
        let name = backend.name().to_string();
        if name.trim().is_empty() {
            log_registry_operation("register", None, "rejected", Some("empty backend name"));
            return Err(CoordinatorError::InvalidBackend(
                "backend name must not be empty".to_string(),
            ));
        }

        let storage = backend.storage();
        let mut backends = self.backends.write();

        if backends.iter().any(|existing| existing.name() == name) {
            log_registry_operation("register", Some(&name), "rejected", Some("duplicate name"));
            return Err(CoordinatorError::duplicate_backend(name));
        }

        for existing in backends.iter() {
            if let Some(location) = storage.overlap_with(&existing.storage()) {
                log_registry_operation("register", Some(&name), "rejected", Some("storage overlap"));
                return Err(match &storage {
                    StorageMedium::Filesystem { root } => {
                        CoordinatorError::filesystem_conflict(&name, existing.name(), root)
                    }
                    _ => CoordinatorError::table_conflict(&name, existing.name(), location),
                });
            }
        }

        debug!(
            backend = %name,
            capabilities = ?backend.capabilities().declared(),
            "Registering cache backend"
        );
        backends.push(backend);
        log_registry_operation("register", Some(&name), "registered", None);
        Ok(())
    }

    /// Backends in registration order
    pub fn list(&self) -> Vec<Arc<dyn CacheBackend>> {
        self.backends.read().clone()
    }

    pub fn find(&self, name: &str) -> Result<Arc<dyn CacheBackend>> {
        self.backends
            .read()
            .iter()
            .find(|backend| backend.name() == name)
            .cloned()
            .ok_or_else(|| CoordinatorError::backend_not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends
            .read()
            .iter()
            .any(|backend| backend.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.backends
            .read()
            .iter()
            .map(|backend| backend.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.backends.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.read().is_empty()
    }
}
