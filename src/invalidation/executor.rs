//! # Invalidation Executor
//!
//! Runs a plan with per-backend isolation:
//!
//! - **Bounded pool**: one tokio task per planned operation, gated by a
//!   semaphore sized from `executor.max_concurrent_operations`
//! - **Writability pre-check**: unwritable entries below a filesystem root are
//!   reported as diagnostics; the flush is attempted regardless
//! - **Timeouts**: optional per-operation bound, reported as `Failed`
//! - **Isolation**: backend errors and task panics become `Failed` outcomes,
//!   sibling operations keep running
//!
//! Reports are collected in plan order. Nothing is retried.

use super::planner::{Operation, PlannedAction, PlannedOperation};
use crate::backends::{BackendError, BackendResult, CacheBackend};
use crate::config::ExecutorConfig;
use crate::logging::{log_backend_operation, log_error};
use crate::models::{BackendReport, Diagnostic, InvalidationResult, Outcome};
use crate::storage::Filesystem;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

/// Report and pre-check findings for one planned operation
#[derive(Debug)]
struct OperationOutput {
    report: BackendReport,
    diagnostics: Vec<Diagnostic>,
}

#[derive(Clone)]
pub struct InvalidationExecutor {
    fs: Arc<dyn Filesystem>,
    semaphore: Arc<Semaphore>,
    max_concurrent_operations: usize,
    operation_timeout: Option<Duration>,
    writability_precheck: bool,
}

impl fmt::Debug for InvalidationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationExecutor")
            .field("max_concurrent_operations", &self.max_concurrent_operations)
            .field("available_permits", &self.semaphore.available_permits())
            .field("operation_timeout", &self.operation_timeout)
            .field("writability_precheck", &self.writability_precheck)
            .finish()
    }
}

impl InvalidationExecutor {
    pub fn new(config: &ExecutorConfig, fs: Arc<dyn Filesystem>) -> Self {
        let max_concurrent_operations = config.max_concurrent_operations.max(1);
        Self {
            fs,
            semaphore: Arc::new(Semaphore::new(max_concurrent_operations)),
            max_concurrent_operations,
            operation_timeout: config.operation_timeout(),
            writability_precheck: config.writability_precheck,
        }
    }

    pub fn max_concurrent_operations(&self) -> usize {
        self.max_concurrent_operations
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout
    }

    pub fn writability_precheck_enabled(&self) -> bool {
        self.writability_precheck
    }

    /// Run every planned operation and append the reports to `result`
    #[instrument(skip(self, plan, result), fields(operation_count = plan.len(), request_id = %result.request_id))]
    pub async fn execute(&self, plan: Vec<PlannedOperation>, result: &mut InvalidationResult) {
        if plan.is_empty() {
            debug!("Empty plan, nothing to execute");
            return;
        }

        let mut handles = Vec::with_capacity(plan.len());
        for operation in plan {
            let name = operation.backend_name().to_string();
            let executor = self.clone();
            let handle = tokio::spawn(async move { executor.run_operation(operation).await });
            handles.push((name, handle));
        }

        for (name, handle) in handles {
            match handle.await {
                Ok(output) => {
                    result.push_report(output.report);
                    result.extend_diagnostics(output.diagnostics);
                }
                Err(e) => {
                    error!(backend = %name, error = %e, "Backend operation task panicked");
                    log_error("executor", "run_operation", &e.to_string(), Some(&name));
                    result.record(name, Outcome::failed(format!("task panicked: {e}")), 0);
                }
            }
        }

        info!(
            flushed = result.flushed().len(),
            skipped = result.skipped().len(),
            failed = result.failed().len(),
            "Invalidation plan executed"
        );
    }

    async fn run_operation(self, planned: PlannedOperation) -> OperationOutput {
        let backend = planned.backend;
        let name = backend.name().to_string();

        let operation = match planned.action {
            PlannedAction::Skip(reason) => {
                log_backend_operation("skip", &name, "skipped", None, Some(&reason));
                return OperationOutput {
                    report: BackendReport {
                        backend: name,
                        outcome: Outcome::skipped(reason),
                        duration_ms: 0,
                    },
                    diagnostics: Vec::new(),
                };
            }
            PlannedAction::Flush(operation) => operation,
        };

        let _permit = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return OperationOutput {
                    report: BackendReport {
                        backend: name,
                        outcome: Outcome::failed(format!("worker pool unavailable: {e}")),
                        duration_ms: 0,
                    },
                    diagnostics: Vec::new(),
                };
            }
        };

        let started = Instant::now();
        let diagnostics = self.writability_precheck(backend.as_ref()).await;

        let outcome = match self.invoke(backend.as_ref(), &operation).await {
            Ok(()) => Outcome::Flushed,
            Err(e) => {
                warn!(backend = %name, operation = operation.label(), error = %e, "Backend flush failed");
                Outcome::failed(e.to_string())
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        let details = match &outcome {
            Outcome::Failed(reason) => Some(reason.as_str()),
            _ => None,
        };
        log_backend_operation(operation.label(), &name, outcome.status(), Some(duration_ms), details);

        OperationOutput {
            report: BackendReport {
                backend: name,
                outcome,
                duration_ms,
            },
            diagnostics,
        }
    }

    async fn invoke(&self, backend: &dyn CacheBackend, operation: &Operation) -> BackendResult<()> {
        let call = async {
            match operation {
                Operation::FlushAll => backend.flush_all().await,
                Operation::FlushByTags(tags) => backend.flush_by_tags(tags).await,
            }
        };

        match self.operation_timeout {
            Some(limit) => timeout(limit, call)
                .await
                .unwrap_or(Err(BackendError::Timeout(limit))),
            None => call.await,
        }
    }

    /// Unwritable entries below the backend's root, one diagnostic each
    async fn writability_precheck(&self, backend: &dyn CacheBackend) -> Vec<Diagnostic> {
        if !self.writability_precheck || !backend.capabilities().writability_check {
            return Vec::new();
        }
        let storage = backend.storage();
        let Some(root) = storage.filesystem_root() else {
            return Vec::new();
        };
        check_writable(Arc::clone(&self.fs), backend.name(), root.to_path_buf()).await
    }
}

/// Walk `root` on the blocking pool and turn every unwritable entry into a
/// diagnostic. A missing root yields nothing.
pub(crate) async fn check_writable(
    fs: Arc<dyn Filesystem>,
    backend: &str,
    root: std::path::PathBuf,
) -> Vec<Diagnostic> {
    let walk_root = root.clone();
    let entries = tokio::task::spawn_blocking(move || fs.unwritable_entries(&walk_root)).await;

    let paths = match entries {
        Ok(Ok(paths)) => paths,
        Ok(Err(e)) => {
            warn!(backend = %backend, root = %root.display(), error = %e, "Writability check could not walk cache root");
            vec![root]
        }
        Err(e) => {
            warn!(backend = %backend, error = %e, "Writability check task failed");
            Vec::new()
        }
    };

    paths
        .into_iter()
        .map(|path| {
            let error = BackendError::UnwritableStorage { path: path.clone() };
            warn!(backend = %backend, error = %error, "Cache storage not writable");
            Diagnostic::unwritable(backend, path, error.to_string())
        })
        .collect()
}
