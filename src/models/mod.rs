//! Data model shared by the registry, planner, executor and hard reset.

pub mod capability;
pub mod request;
pub mod result;

pub use capability::{Capabilities, Capability, StorageMedium};
pub use request::{InvalidationMode, InvalidationRequest, TagSet};
pub use result::{BackendReport, Diagnostic, DiagnosticKind, InvalidationResult, Outcome};
