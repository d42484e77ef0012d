//! # Hard Reset
//!
//! Degraded-mode wipe used when the normal flush path cannot be trusted. It
//! never consults the registry and never calls a backend:
//!
//! 1. Empties the configured cache root, keeping the sentinel file if it was
//!    there before.
//! 2. Truncates every relational table whose name starts with a cache-table
//!    prefix.
//! 3. Optionally clears the whole in-process code cache.
//!
//! Steps 1 and 2 run concurrently. Every failure is recorded and the
//! remaining work continues.

use crate::code_cache::CodeCacheProvider;
use crate::config::HardResetConfig;
use crate::constants::hard_reset_targets;
use crate::logging::log_hard_reset_operation;
use crate::models::{BackendReport, Diagnostic, InvalidationResult, Outcome};
use crate::storage::{is_cache_table, Filesystem, RelationalStore, RemovalReport, StorageError};
use futures::future::join_all;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct HardReset {
    config: HardResetConfig,
    fs: Arc<dyn Filesystem>,
    store: Option<Arc<dyn RelationalStore>>,
    code_cache: CodeCacheProvider,
}

impl fmt::Debug for HardReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HardReset")
            .field("config", &self.config)
            .field("store", &self.store.as_ref().map(|s| s.driver_name()))
            .field("code_cache", &self.code_cache.provider_name())
            .finish()
    }
}

/// Outcome of the blocking filesystem wipe
#[derive(Debug, Default)]
struct WipeSummary {
    removal: RemovalReport,
    listing_error: Option<String>,
}

impl HardReset {
    pub fn new(
        config: HardResetConfig,
        fs: Arc<dyn Filesystem>,
        store: Option<Arc<dyn RelationalStore>>,
        code_cache: CodeCacheProvider,
    ) -> Self {
        Self {
            config,
            fs,
            store,
            code_cache,
        }
    }

    pub fn config(&self) -> &HardResetConfig {
        &self.config
    }

    pub fn filesystem_target(&self) -> String {
        format!(
            "{}{}",
            hard_reset_targets::FILESYSTEM_PREFIX,
            self.config.cache_root.display()
        )
    }

    /// Wipe everything and append one report per target to `result`
    #[instrument(skip(self, result), fields(request_id = %result.request_id, cache_root = %self.config.cache_root.display()))]
    pub async fn run(&self, result: &mut InvalidationResult) {
        warn!("Hard reset requested, bypassing cache backends");

        let ((filesystem_report, diagnostics), table_reports) =
            tokio::join!(self.wipe_filesystem(), self.truncate_tables());

        result.push_report(filesystem_report);
        result.extend_diagnostics(diagnostics);
        for report in table_reports {
            result.push_report(report);
        }

        if self.config.include_code_cache {
            result.push_report(self.clear_code_cache().await);
        }

        info!(
            targets = result.reports.len(),
            failed = result.failed().len(),
            "Hard reset finished"
        );
    }

    async fn wipe_filesystem(&self) -> (BackendReport, Vec<Diagnostic>) {
        let target = self.filesystem_target();
        let started = Instant::now();
        let fs = Arc::clone(&self.fs);
        let root = self.config.cache_root.clone();
        let sentinel = root.join(&self.config.sentinel_file);

        let summary = tokio::task::spawn_blocking(move || wipe_root(fs.as_ref(), &root, &sentinel))
            .await
            .unwrap_or_else(|e| WipeSummary {
                listing_error: Some(format!("wipe task failed: {e}")),
                ..WipeSummary::default()
            });

        let diagnostics: Vec<Diagnostic> = summary
            .removal
            .failures
            .iter()
            .map(|failure| {
                Diagnostic::partial_wipe(&target, Some(failure.path.clone()), &failure.error)
            })
            .collect();

        let outcome = match (&summary.listing_error, summary.removal.failures.len()) {
            (Some(reason), _) => Outcome::failed(reason.clone()),
            (None, 0) => Outcome::Flushed,
            (None, failed) => Outcome::failed(format!(
                "{failed} entries could not be removed, {} removed",
                summary.removal.removed
            )),
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let details = format!("removed {} entries", summary.removal.removed);
        log_hard_reset_operation(&target, outcome.status(), Some(duration_ms), Some(&details));

        (
            BackendReport {
                backend: target,
                outcome,
                duration_ms,
            },
            diagnostics,
        )
    }

    async fn truncate_tables(&self) -> Vec<BackendReport> {
        let Some(store) = &self.store else {
            debug!("No relational store configured, skipping table truncation");
            return Vec::new();
        };

        let started = Instant::now();
        let tables = match store.list_tables().await {
            Ok(tables) => tables,
            Err(e) => {
                let target = format!("{}*", hard_reset_targets::TABLE_PREFIX);
                log_hard_reset_operation(&target, "failed", None, Some(&e.to_string()));
                return vec![BackendReport {
                    backend: target,
                    outcome: Outcome::failed(format!("could not list tables: {e}")),
                    duration_ms: started.elapsed().as_millis() as u64,
                }];
            }
        };

        let matched: Vec<String> = tables
            .into_iter()
            .filter(|table| is_cache_table(table, &self.config.table_prefixes))
            .collect();
        debug!(tables = ?matched, "Cache tables selected for truncation");

        join_all(matched.into_iter().map(|table| {
            let store = Arc::clone(store);
            async move {
                let target = format!("{}{table}", hard_reset_targets::TABLE_PREFIX);
                let started = Instant::now();
                let outcome = match store.truncate(&table).await {
                    Ok(()) => Outcome::Flushed,
                    Err(e) => Outcome::failed(e.to_string()),
                };
                let duration_ms = started.elapsed().as_millis() as u64;
                log_hard_reset_operation(&target, outcome.status(), Some(duration_ms), None);
                BackendReport {
                    backend: target,
                    outcome,
                    duration_ms,
                }
            }
        }))
        .await
    }

    async fn clear_code_cache(&self) -> BackendReport {
        let started = Instant::now();
        let outcome = match self.code_cache.clear_all().await {
            Ok(cleared) => {
                debug!(cleared, provider = self.code_cache.provider_name(), "Code cache cleared");
                Outcome::Flushed
            }
            Err(e) => Outcome::failed(e.to_string()),
        };
        let duration_ms = started.elapsed().as_millis() as u64;
        log_hard_reset_operation(
            hard_reset_targets::CODE_CACHE,
            outcome.status(),
            Some(duration_ms),
            None,
        );
        BackendReport {
            backend: hard_reset_targets::CODE_CACHE.to_string(),
            outcome,
            duration_ms,
        }
    }
}

/// Remove every entry below `root`, recreating `sentinel` if it existed
fn wipe_root(fs: &dyn Filesystem, root: &std::path::Path, sentinel: &std::path::Path) -> WipeSummary {
    let mut summary = WipeSummary::default();
    if !fs.exists(root) {
        return summary;
    }

    let had_sentinel = fs.exists(sentinel);
    let children: Vec<PathBuf> = match fs.list_dir(root) {
        Ok(children) => children,
        Err(e) => {
            summary.listing_error = Some(e.to_string());
            return summary;
        }
    };

    for child in children {
        summary.removal.merge(fs.remove_all(&child));
    }

    if had_sentinel {
        if let Err(e) = fs.touch(sentinel) {
            let (path, error) = match e {
                StorageError::Io { path, source } => (path, source.to_string()),
                other => (sentinel.to_path_buf(), other.to_string()),
            };
            summary.removal.failures.push(crate::storage::RemovalFailure {
                path,
                error: format!("sentinel not restored: {error}"),
            });
        }
    }

    summary
}
