//! Backend capabilities and storage media.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single operation a backend may declare support for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    FlushAll,
    FlushByTag,
    FlushExceptTags,
    WritabilityCheck,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Capability::FlushAll => "flush_all",
            Capability::FlushByTag => "flush_by_tag",
            Capability::FlushExceptTags => "flush_except_tags",
            Capability::WritabilityCheck => "writability_check",
        };
        f.write_str(label)
    }
}

/// Capability set declared by a backend at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub flush_all: bool,
    pub flush_by_tag: bool,
    pub flush_except_tags: bool,
    pub writability_check: bool,
}

impl Capabilities {
    /// Only `FlushAll`
    pub const fn flush_only() -> Self {
        Self {
            flush_all: true,
            flush_by_tag: false,
            flush_except_tags: false,
            writability_check: false,
        }
    }

    pub const fn with_flush_by_tag(mut self) -> Self {
        self.flush_by_tag = true;
        self
    }

    pub const fn with_writability_check(mut self) -> Self {
        self.writability_check = true;
        self
    }

    pub const fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::FlushAll => self.flush_all,
            Capability::FlushByTag => self.flush_by_tag,
            Capability::FlushExceptTags => self.flush_except_tags,
            Capability::WritabilityCheck => self.writability_check,
        }
    }

    pub fn declared(&self) -> Vec<Capability> {
        [
            Capability::FlushAll,
            Capability::FlushByTag,
            Capability::FlushExceptTags,
            Capability::WritabilityCheck,
        ]
        .into_iter()
        .filter(|capability| self.supports(*capability))
        .collect()
    }
}

/// Where a backend keeps its entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "medium", rename_all = "snake_case")]
pub enum StorageMedium {
    Filesystem { root: PathBuf },
    Database { tables: Vec<String> },
    Process,
}

impl StorageMedium {
    pub fn filesystem_root(&self) -> Option<&Path> {
        match self {
            StorageMedium::Filesystem { root } => Some(root.as_path()),
            _ => None,
        }
    }

    /// Location shared with `other`, if any
    ///
    /// Filesystem roots conflict when one contains the other.
    pub fn overlap_with(&self, other: &StorageMedium) -> Option<String> {
        match (self, other) {
            (StorageMedium::Filesystem { root: a }, StorageMedium::Filesystem { root: b }) => {
                if a.starts_with(b) || b.starts_with(a) {
                    Some(a.display().to_string())
                } else {
                    None
                }
            }
            (StorageMedium::Database { tables: a }, StorageMedium::Database { tables: b }) => a
                .iter()
                .find(|table| b.iter().any(|other| other.eq_ignore_ascii_case(table)))
                .cloned(),
            _ => None,
        }
    }
}
