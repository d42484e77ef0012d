//! # Invalidation Planner
//!
//! Turns an [`InvalidationMode`] into one [`PlannedOperation`] per registered
//! backend, in registration order. Every backend appears exactly once, either
//! with an operation to run or with the reason it is skipped.

use crate::backends::CacheBackend;
use crate::constants::skip_reasons;
use crate::models::{Capability, InvalidationMode, TagSet};
use std::sync::Arc;

/// Backend call the executor will make
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    FlushAll,
    FlushByTags(TagSet),
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::FlushAll => "flush_all",
            Operation::FlushByTags(_) => "flush_by_tags",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAction {
    Flush(Operation),
    Skip(String),
}

#[derive(Debug, Clone)]
pub struct PlannedOperation {
    pub backend: Arc<dyn CacheBackend>,
    pub action: PlannedAction,
}

impl PlannedOperation {
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.action, PlannedAction::Skip(_))
    }
}

/// Build the plan for `mode` over `backends`
pub fn plan(mode: &InvalidationMode, backends: &[Arc<dyn CacheBackend>]) -> Vec<PlannedOperation> {
    backends
        .iter()
        .map(|backend| PlannedOperation {
            backend: Arc::clone(backend),
            action: plan_action(mode, backend.as_ref()),
        })
        .collect()
}

// `flush_all` is required of every backend, so `All` never skips.
fn plan_action(mode: &InvalidationMode, backend: &dyn CacheBackend) -> PlannedAction {
    match mode {
        InvalidationMode::All => PlannedAction::Flush(Operation::FlushAll),
        InvalidationMode::ByTags(tags) => {
            if backend.capabilities().supports(Capability::FlushByTag) {
                PlannedAction::Flush(Operation::FlushByTags(tags.clone()))
            } else {
                PlannedAction::Skip(skip_reasons::CAPABILITY_UNSUPPORTED.to_string())
            }
        }
        // Exclusion is by backend name. FlushExceptTags is never delegated to
        // a backend; the remaining backends are flushed whole.
        InvalidationMode::AllExceptTags(excluded) => {
            if excluded.contains(backend.name()) {
                PlannedAction::Skip(skip_reasons::EXCLUDED_BY_TAG.to_string())
            } else {
                PlannedAction::Flush(Operation::FlushAll)
            }
        }
    }
}
