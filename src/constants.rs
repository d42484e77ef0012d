//! System-wide constants: defaults, environment variable names, well-known
//! cache group tags and skip reasons.

pub mod defaults {
    pub const MAX_CONCURRENT_OPERATIONS: usize = 4;
    pub const CACHE_ROOT: &str = "var/cache";
    pub const SENTINEL_FILE: &str = ".gitkeep";
    /// Table-name prefixes recognized as cache tables by the hard reset
    pub const CACHE_TABLE_PREFIXES: &[&str] = &["cf_", "cache_"];
    pub const CACHE_TABLE_PREFIX: &str = "cf_";
    pub const TAGS_TABLE_SUFFIX: &str = "_tags";
    pub const DATABASE_MAX_CONNECTIONS: u32 = 5;
    pub const DATABASE_ACQUIRE_TIMEOUT_SECONDS: u64 = 10;
}

pub mod env_vars {
    pub const ENVIRONMENT: &str = "CACHE_COORDINATOR_ENV";
    pub const CONFIG_DIRECTORY: &str = "CACHE_COORDINATOR_CONFIG_DIR";
    /// Prefix for `CACHE_COORDINATOR__SECTION__FIELD` overrides
    pub const OVERRIDE_PREFIX: &str = "CACHE_COORDINATOR";
}

pub mod groups {
    pub const PAGES: &str = "pages";
    pub const SYSTEM: &str = "system";
    pub const CONFIGURATION: &str = "configuration";
    pub const PAGE_CACHE_BACKENDS: &[&str] = &["pages", "pagesection"];
}

pub mod skip_reasons {
    pub const CAPABILITY_UNSUPPORTED: &str = "capability unsupported";
    pub const EXCLUDED_BY_TAG: &str = "excluded by tag";
}

/// Report names used by the hard reset, which works beneath the registry
pub mod hard_reset_targets {
    pub const FILESYSTEM_PREFIX: &str = "filesystem:";
    pub const TABLE_PREFIX: &str = "table:";
    pub const CODE_CACHE: &str = "code-cache";
}
