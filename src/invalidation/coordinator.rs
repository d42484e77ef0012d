//! # Cache Coordinator
//!
//! Public entry point for cache invalidation. A caller first presents an
//! [`AccessToken`]; once accepted it receives an [`AuthorizedCoordinator`]
//! exposing the clear operations. Authorization happens once per handle and
//! before any storage is touched.
//!
//! ```text
//! authorize(token) ──► AuthorizedCoordinator
//!                        ├── clear_all(false) ─┐
//!                        ├── clear_by_tags     ├─► planner ──► executor ──► backends
//!                        ├── clear_all_except ─┘
//!                        ├── clear_all(true) ────► hard reset (no registry)
//!                        └── clear_opcode_cache ─► code cache
//! ```

use super::executor::{check_writable, InvalidationExecutor};
use super::hard_reset::HardReset;
use super::planner::plan;
use crate::auth::{AccessPolicy, AccessToken};
use crate::code_cache::CodeCacheProvider;
use crate::config::{CacheGroupsConfig, CoordinatorConfig};
use crate::constants::{groups, hard_reset_targets};
use crate::error::{CoordinatorError, Result};
use crate::logging::log_invalidation_operation;
use crate::models::{Diagnostic, InvalidationMode, InvalidationRequest, InvalidationResult, Outcome, TagSet};
use crate::registry::BackendRegistry;
use crate::storage::{Filesystem, RelationalStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

const OPCODE_CACHE_OPERATION: &str = "opcode_cache";

#[derive(Debug)]
pub struct CacheCoordinator {
    registry: Arc<BackendRegistry>,
    executor: InvalidationExecutor,
    hard_reset: HardReset,
    code_cache: CodeCacheProvider,
    fs: Arc<dyn Filesystem>,
    policy: AccessPolicy,
    groups: CacheGroupsConfig,
}

impl CacheCoordinator {
    /// Assemble a coordinator from configuration and already-built collaborators
    pub fn new(
        config: &CoordinatorConfig,
        registry: Arc<BackendRegistry>,
        fs: Arc<dyn Filesystem>,
        store: Option<Arc<dyn RelationalStore>>,
        code_cache: CodeCacheProvider,
    ) -> Self {
        Self {
            executor: InvalidationExecutor::new(&config.executor, Arc::clone(&fs)),
            hard_reset: HardReset::new(
                config.hard_reset.clone(),
                Arc::clone(&fs),
                store,
                code_cache.clone(),
            ),
            registry,
            code_cache,
            fs,
            policy: AccessPolicy::from_config(&config.access),
            groups: config.groups.clone(),
        }
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    pub fn code_cache(&self) -> &CodeCacheProvider {
        &self.code_cache
    }

    pub fn cache_root(&self) -> &Path {
        &self.hard_reset.config().cache_root
    }

    /// Validate `token` and hand out the operations it grants
    pub fn authorize(&self, token: &AccessToken) -> Result<AuthorizedCoordinator<'_>> {
        self.policy.validate(token)?;
        Ok(AuthorizedCoordinator {
            coordinator: self,
            principal: token.principal.clone(),
        })
    }

    #[instrument(skip(self), fields(operation = request.operation_label()))]
    async fn execute(&self, request: InvalidationRequest, principal: &str) -> Result<InvalidationResult> {
        request.validate()?;

        let mut result = InvalidationResult::new(request.operation_label());
        let request_id = result.request_id.to_string();
        log_invalidation_operation(
            request.operation_label(),
            Some(&request_id),
            request.mode.label(),
            "started",
            None,
            Some(principal),
        );

        if request.hard {
            if self.executor.writability_precheck_enabled() {
                let diagnostics = check_writable(
                    Arc::clone(&self.fs),
                    &self.hard_reset.filesystem_target(),
                    self.cache_root().to_path_buf(),
                )
                .await;
                result.extend_diagnostics(diagnostics);
            }
            self.hard_reset.run(&mut result).await;
        } else {
            let backends = self.registry.list();
            let planned = plan(&request.mode, &backends);
            self.executor.execute(planned, &mut result).await;
        }

        let result = result.finish();
        log_invalidation_operation(
            request.operation_label(),
            Some(&request_id),
            request.mode.label(),
            if result.has_failures() { "completed_with_failures" } else { "completed" },
            Some(result.reports.len()),
            None,
        );
        Ok(result)
    }
}

/// Operations available after a successful [`CacheCoordinator::authorize`]
#[derive(Debug)]
pub struct AuthorizedCoordinator<'a> {
    coordinator: &'a CacheCoordinator,
    principal: String,
}

impl AuthorizedCoordinator<'_> {
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// Flush every backend, or wipe storage directly when `hard` is set
    pub async fn clear_all(&self, hard: bool) -> Result<InvalidationResult> {
        self.coordinator
            .execute(InvalidationRequest::all(hard), &self.principal)
            .await
    }

    pub async fn clear_by_tags(&self, tags: TagSet) -> Result<InvalidationResult> {
        self.coordinator
            .execute(InvalidationRequest::by_tags(tags), &self.principal)
            .await
    }

    /// Flush every backend whose name is not in `excluded`
    pub async fn clear_all_except(&self, excluded: TagSet) -> Result<InvalidationResult> {
        self.coordinator
            .execute(InvalidationRequest::all_except(excluded), &self.principal)
            .await
    }

    pub async fn clear_page_cache(&self) -> Result<InvalidationResult> {
        self.clear_by_tags(TagSet::new([groups::PAGES])).await
    }

    pub async fn clear_system_cache(&self) -> Result<InvalidationResult> {
        self.clear_by_tags(TagSet::new([groups::SYSTEM])).await
    }

    pub async fn clear_configuration_cache(&self) -> Result<InvalidationResult> {
        self.clear_by_tags(TagSet::new([groups::CONFIGURATION])).await
    }

    /// Flush everything except the configured page-cache backends
    pub async fn clear_all_except_page_cache(&self) -> Result<InvalidationResult> {
        let request = InvalidationRequest {
            mode: self.page_cache_exclusion(),
            hard: false,
        };
        self.execute(request).await
    }

    /// Clear the in-process code cache, or only `target_file` when given
    ///
    /// `target_file` must be absolute. Clearing a file that was never cached
    /// still reports `Flushed`.
    pub async fn clear_opcode_cache(&self, target_file: Option<&Path>) -> Result<InvalidationResult> {
        if let Some(path) = target_file {
            if path.is_relative() {
                return Err(CoordinatorError::invalid_request(format!(
                    "opcode cache target must be an absolute path, got {}",
                    path.display()
                )));
            }
        }

        let code_cache = &self.coordinator.code_cache;
        let mut result = InvalidationResult::new(OPCODE_CACHE_OPERATION);
        let request_id = result.request_id.to_string();
        let started = Instant::now();

        let outcome = match target_file {
            Some(path) => match code_cache.clear_file(path).await {
                Ok(was_cached) => {
                    info!(path = %path.display(), was_cached, "Code cache entry cleared");
                    Outcome::Flushed
                }
                Err(e) => Outcome::failed(e.to_string()),
            },
            None => match code_cache.clear_all().await {
                Ok(cleared) => {
                    info!(cleared, provider = code_cache.provider_name(), "Code cache cleared");
                    Outcome::Flushed
                }
                Err(e) => Outcome::failed(e.to_string()),
            },
        };

        if let Outcome::Failed(reason) = &outcome {
            warn!(reason = %reason, "Code cache clear failed");
        }
        result.record(
            hard_reset_targets::CODE_CACHE,
            outcome,
            started.elapsed().as_millis() as u64,
        );

        let details = target_file.map(|path| path.display().to_string());
        log_invalidation_operation(
            OPCODE_CACHE_OPERATION,
            Some(&request_id),
            if target_file.is_some() { "file" } else { "all" },
            if result.has_failures() { "completed_with_failures" } else { "completed" },
            Some(1),
            details.as_deref(),
        );
        Ok(result.finish())
    }

    /// Unwritable entries below the configured cache root; empty when fine
    pub async fn assure_cache_directory_writable(&self) -> Vec<Diagnostic> {
        let root: PathBuf = self.coordinator.cache_root().to_path_buf();
        let label = self.coordinator.hard_reset.filesystem_target();
        check_writable(Arc::clone(&self.coordinator.fs), &label, root).await
    }

    /// Run an arbitrary request
    pub async fn execute(&self, request: InvalidationRequest) -> Result<InvalidationResult> {
        self.coordinator.execute(request, &self.principal).await
    }

    /// The mode `clear_all_except_page_cache` would run
    pub fn page_cache_exclusion(&self) -> InvalidationMode {
        InvalidationMode::AllExceptTags(TagSet::new(&self.coordinator.groups.page_cache_backends))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AccessRole;
    use crate::backends::MemoryBackend;
    use crate::storage::LocalFilesystem;

    fn coordinator(registry: BackendRegistry) -> CacheCoordinator {
        let dir = std::env::temp_dir().join("cache-coordinator-unit-absent");
        let config = CoordinatorConfig {
            hard_reset: crate::config::HardResetConfig {
                cache_root: dir,
                ..Default::default()
            },
            ..Default::default()
        };
        CacheCoordinator::new(
            &config,
            Arc::new(registry),
            Arc::new(LocalFilesystem::new()),
            None,
            CodeCacheProvider::from_config(&config.code_cache),
        )
    }

    #[test]
    fn test_authorize_rejects_insufficient_role() {
        let coordinator = coordinator(BackendRegistry::new());
        let error = coordinator
            .authorize(&AccessToken::new("viewer", AccessRole::ReadOnly))
            .unwrap_err();
        assert!(matches!(error, CoordinatorError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_clear_by_tags_rejects_empty_tags() {
        let coordinator = coordinator(BackendRegistry::new());
        let authorized = coordinator.authorize(&AccessToken::admin("ops")).unwrap();
        let error = authorized.clear_by_tags(TagSet::default()).await.unwrap_err();
        assert!(matches!(error, CoordinatorError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_page_cache_shortcut_uses_configured_backends() {
        let registry = BackendRegistry::new();
        for name in ["pages", "pagesection", "hash"] {
            registry.register(Arc::new(MemoryBackend::new(name))).unwrap();
        }
        let coordinator = coordinator(registry);
        let authorized = coordinator.authorize(&AccessToken::admin("ops")).unwrap();

        let result = authorized.clear_all_except_page_cache().await.unwrap();
        assert_eq!(result.skipped(), vec!["pages", "pagesection"]);
        assert_eq!(result.flushed(), vec!["hash"]);
        assert!(result.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_opcode_cache_file_clear() {
        let coordinator = coordinator(BackendRegistry::new());
        let compiled = coordinator.code_cache().compiled().unwrap().clone();
        compiled.store("/srv/app/index.php", b"compiled-index");

        let authorized = coordinator.authorize(&AccessToken::admin("ops")).unwrap();
        let result = authorized
            .clear_opcode_cache(Some(Path::new("/srv/app/index.php")))
            .await
            .unwrap();

        assert_eq!(result.outcome_for("code-cache"), Some(&Outcome::Flushed));
        assert!(!compiled.contains(Path::new("/srv/app/index.php")));

        let error = authorized
            .clear_opcode_cache(Some(Path::new("relative.php")))
            .await
            .unwrap_err();
        assert!(matches!(error, CoordinatorError::InvalidRequest(_)));
    }
}
