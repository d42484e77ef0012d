//! Invalidation results.
//!
//! A result enumerates every backend the request touched. Partial success is a
//! normal outcome; callers inspect the per-backend reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Flushed,
    Skipped(String),
    Failed(String),
}

impl Outcome {
    pub fn skipped<R: Into<String>>(reason: R) -> Self {
        Outcome::Skipped(reason.into())
    }

    pub fn failed<R: Into<String>>(reason: R) -> Self {
        Outcome::Failed(reason.into())
    }

    pub fn is_flushed(&self) -> bool {
        matches!(self, Outcome::Flushed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            Outcome::Flushed => "flushed",
            Outcome::Skipped(_) => "skipped",
            Outcome::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Flushed => f.write_str("flushed"),
            Outcome::Skipped(reason) => write!(f, "skipped ({reason})"),
            Outcome::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendReport {
    pub backend: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Found during the writability pre-check; never blocks the flush
    UnwritableStorage,
    /// An entry the hard reset could not remove
    PartialWipe,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub backend: String,
    pub kind: DiagnosticKind,
    pub path: Option<PathBuf>,
    pub message: String,
}

impl Diagnostic {
    pub fn unwritable<B: Into<String>, M: Into<String>>(backend: B, path: PathBuf, message: M) -> Self {
        Self {
            backend: backend.into(),
            kind: DiagnosticKind::UnwritableStorage,
            path: Some(path),
            message: message.into(),
        }
    }

    pub fn partial_wipe<B: Into<String>, M: Into<String>>(
        backend: B,
        path: Option<PathBuf>,
        message: M,
    ) -> Self {
        Self {
            backend: backend.into(),
            kind: DiagnosticKind::PartialWipe,
            path,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidationResult {
    pub request_id: Uuid,
    pub operation: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub reports: Vec<BackendReport>,
    pub diagnostics: Vec<Diagnostic>,
}

impl InvalidationResult {
    pub fn new<O: Into<String>>(operation: O) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            operation: operation.into(),
            started_at: Utc::now(),
            finished_at: None,
            reports: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn push_report(&mut self, report: BackendReport) {
        self.reports.push(report);
    }

    pub fn record<B: Into<String>>(&mut self, backend: B, outcome: Outcome, duration_ms: u64) {
        self.reports.push(BackendReport {
            backend: backend.into(),
            outcome,
            duration_ms,
        });
    }

    pub fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend_diagnostics<I: IntoIterator<Item = Diagnostic>>(&mut self, diagnostics: I) {
        self.diagnostics.extend(diagnostics);
    }

    /// Stamp the finish time
    pub fn finish(mut self) -> Self {
        self.finished_at = Some(Utc::now());
        self
    }

    pub fn outcome_for(&self, backend: &str) -> Option<&Outcome> {
        self.reports
            .iter()
            .find(|report| report.backend == backend)
            .map(|report| &report.outcome)
    }

    pub fn backends(&self) -> Vec<&str> {
        self.reports
            .iter()
            .map(|report| report.backend.as_str())
            .collect()
    }

    pub fn flushed(&self) -> Vec<&str> {
        self.filter_backends(Outcome::is_flushed)
    }

    pub fn skipped(&self) -> Vec<&str> {
        self.filter_backends(Outcome::is_skipped)
    }

    pub fn failed(&self) -> Vec<&str> {
        self.filter_backends(Outcome::is_failed)
    }

    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(|report| report.outcome.is_failed())
    }

    pub fn diagnostics_for(&self, backend: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.backend == backend)
            .collect()
    }

    fn filter_backends(&self, predicate: impl Fn(&Outcome) -> bool) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|report| predicate(&report.outcome))
            .map(|report| report.backend.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InvalidationResult {
        let mut result = InvalidationResult::new("all");
        result.record("pages", Outcome::Flushed, 3);
        result.record("configuration", Outcome::skipped("capability unsupported"), 0);
        result.record("hash", Outcome::failed("connection refused"), 12);
        result.push_diagnostic(Diagnostic::unwritable(
            "pages",
            PathBuf::from("/c/a"),
            "Storage not writable: /c/a",
        ));
        result
    }

    #[test]
    fn test_outcome_partitions() {
        let result = sample();
        assert_eq!(result.backends(), vec!["pages", "configuration", "hash"]);
        assert_eq!(result.flushed(), vec!["pages"]);
        assert_eq!(result.skipped(), vec!["configuration"]);
        assert_eq!(result.failed(), vec!["hash"]);
        assert!(result.has_failures());
        assert_eq!(result.diagnostics_for("pages").len(), 1);
        assert!(result.diagnostics_for("hash").is_empty());
    }

    #[test]
    fn test_finish_stamps_time() {
        let result = sample().finish();
        let finished = result.finished_at.unwrap();
        assert!(finished >= result.started_at);
    }

    #[test]
    fn test_serializes_outcome_with_reason() {
        let result = sample();
        let json = serde_json::to_value(&result.reports[1]).unwrap();
        assert_eq!(json["outcome"]["status"], "skipped");
        assert_eq!(json["outcome"]["reason"], "capability unsupported");

        let flushed = serde_json::to_value(&result.reports[0]).unwrap();
        assert_eq!(flushed["outcome"]["status"], "flushed");
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Flushed.to_string(), "flushed");
        assert_eq!(
            Outcome::failed("disk full").to_string(),
            "failed (disk full)"
        );
    }
}
