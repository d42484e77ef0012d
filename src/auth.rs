//! # Access Control
//!
//! The coordinator does not authenticate anyone. The host layer presents an
//! [`AccessToken`] describing an already-authenticated principal, and the
//! [`AccessPolicy`] decides once, before any backend is touched, whether that
//! principal may clear caches.
//!
//! ## Usage
//!
//! ```rust
//! use cache_coordinator::auth::{AccessPolicy, AccessRole, AccessToken};
//! use cache_coordinator::config::AccessConfig;
//!
//! let policy = AccessPolicy::from_config(&AccessConfig::default());
//! assert!(policy.validate(&AccessToken::new("ops", AccessRole::Admin)).is_ok());
//! assert!(policy.validate(&AccessToken::new("ops", AccessRole::ReadOnly)).is_err());
//! ```

use crate::config::AccessConfig;
use crate::error::{CoordinatorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, warn};

/// Role carried by a token, ordered from least to most privileged
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessRole {
    ReadOnly,
    Maintainer,
    #[default]
    Admin,
}

impl fmt::Display for AccessRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AccessRole::ReadOnly => "read_only",
            AccessRole::Maintainer => "maintainer",
            AccessRole::Admin => "admin",
        };
        f.write_str(label)
    }
}

/// Authenticated identity handed over by the host layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub principal: String,
    pub role: AccessRole,
    pub issued_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new<P: Into<String>>(principal: P, role: AccessRole) -> Self {
        Self {
            principal: principal.into(),
            role,
            issued_at: Utc::now(),
        }
    }

    pub fn admin<P: Into<String>>(principal: P) -> Self {
        Self::new(principal, AccessRole::Admin)
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    allowed_principals: HashSet<String>,
    required_role: AccessRole,
}

impl AccessPolicy {
    pub fn from_config(config: &AccessConfig) -> Self {
        Self {
            allowed_principals: config.allowed_principals.iter().cloned().collect(),
            required_role: config.required_role,
        }
    }

    pub fn required_role(&self) -> AccessRole {
        self.required_role
    }

    /// Check a token against the policy
    ///
    /// An empty principal list admits any principal holding the required role.
    pub fn validate(&self, token: &AccessToken) -> Result<()> {
        if token.principal.trim().is_empty() {
            warn!("Rejected access token without principal");
            return Err(CoordinatorError::unauthorized("token has no principal"));
        }

        if !self.allowed_principals.is_empty()
            && !self.allowed_principals.contains(&token.principal)
        {
            warn!(principal = %token.principal, "Principal not allowed to clear caches");
            return Err(CoordinatorError::unauthorized(format!(
                "principal '{}' is not allowed to clear caches",
                token.principal
            )));
        }

        if token.role < self.required_role {
            warn!(
                principal = %token.principal,
                role = %token.role,
                required = %self.required_role,
                "Access role insufficient"
            );
            return Err(CoordinatorError::unauthorized(format!(
                "role {} is below required role {}",
                token.role, self.required_role
            )));
        }

        debug!(principal = %token.principal, role = %token.role, "Access token accepted");
        Ok(())
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::from_config(&AccessConfig::default())
    }
}
