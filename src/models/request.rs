//! Invalidation requests and tag sets.

use crate::error::{CoordinatorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Ordered, de-duplicated set of non-empty tags
///
/// Blank input tags are dropped and surrounding whitespace is trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter().collect()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|tag| tag.as_ref().trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.to_vec().join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "tags", rename_all = "snake_case")]
pub enum InvalidationMode {
    All,
    ByTags(TagSet),
    AllExceptTags(TagSet),
}

impl InvalidationMode {
    pub fn label(&self) -> &'static str {
        match self {
            InvalidationMode::All => "all",
            InvalidationMode::ByTags(_) => "by_tags",
            InvalidationMode::AllExceptTags(_) => "all_except_tags",
        }
    }
}

/// One caller invocation; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationRequest {
    pub mode: InvalidationMode,
    /// Take the degraded wipe path instead of the backends' flush API
    pub hard: bool,
}

impl InvalidationRequest {
    pub fn all(hard: bool) -> Self {
        Self {
            mode: InvalidationMode::All,
            hard,
        }
    }

    pub fn by_tags(tags: TagSet) -> Self {
        Self {
            mode: InvalidationMode::ByTags(tags),
            hard: false,
        }
    }

    pub fn all_except(tags: TagSet) -> Self {
        Self {
            mode: InvalidationMode::AllExceptTags(tags),
            hard: false,
        }
    }

    pub fn operation_label(&self) -> &'static str {
        if self.hard {
            "hard_reset"
        } else {
            self.mode.label()
        }
    }

    pub fn validate(&self) -> Result<()> {
        match &self.mode {
            InvalidationMode::ByTags(tags) if tags.is_empty() => Err(
                CoordinatorError::invalid_request("flush by tags requires at least one tag"),
            ),
            InvalidationMode::All => Ok(()),
            _ if self.hard => Err(CoordinatorError::invalid_request(
                "hard reset is only available for flush all",
            )),
            _ => Ok(()),
        }
    }
}
