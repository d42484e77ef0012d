//! Fixture builders for coordinator integration tests

use cache_coordinator::auth::AccessToken;
use cache_coordinator::backends::CacheBackend;
use cache_coordinator::code_cache::CodeCacheProvider;
use cache_coordinator::config::CoordinatorConfig;
use cache_coordinator::invalidation::CacheCoordinator;
use cache_coordinator::registry::BackendRegistry;
use cache_coordinator::storage::{
    Filesystem, LocalFilesystem, MemoryRelationalStore, RelationalStore,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const SENTINEL: &str = ".gitkeep";

pub fn admin() -> AccessToken {
    AccessToken::admin("integration-tests")
}

/// Create a small cache tree below `root`
pub fn populate_cache(root: &Path) {
    fs::create_dir_all(root.join("pages/home")).unwrap();
    fs::write(root.join("pages/home/entry"), "<html>").unwrap();
    fs::create_dir_all(root.join("system")).unwrap();
    fs::write(root.join("system/settings"), "cached").unwrap();
    fs::write(root.join("top-level"), "x").unwrap();
}

/// Names of the entries directly below `root`, sorted
pub fn entries(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Tables from the hard reset scenario: two cache tables and one user table
pub fn scenario_store() -> Arc<MemoryRelationalStore> {
    let store = MemoryRelationalStore::with_tables(["cf_pages", "cache_hash", "users"]);
    store.insert_entry("cf_pages", "home");
    store.insert_entry("cache_hash", "abc");
    store.insert_entry("users", "alice");
    Arc::new(store)
}

pub struct CoordinatorFixture {
    pub cache_dir: TempDir,
    pub coordinator: CacheCoordinator,
    root: PathBuf,
}

impl CoordinatorFixture {
    pub fn cache_root(&self) -> PathBuf {
        self.root.clone()
    }
}

pub struct CoordinatorFixtureBuilder {
    config: CoordinatorConfig,
    backends: Vec<Arc<dyn CacheBackend>>,
    fs: Arc<dyn Filesystem>,
    store: Option<Arc<dyn RelationalStore>>,
    code_cache: CodeCacheProvider,
    cache_root: Option<PathBuf>,
    populate: bool,
}

impl Default for CoordinatorFixtureBuilder {
    fn default() -> Self {
        Self {
            config: CoordinatorConfig::default(),
            backends: Vec::new(),
            fs: Arc::new(LocalFilesystem::new()),
            store: None,
            code_cache: CodeCacheProvider::noop(),
            cache_root: None,
            populate: true,
        }
    }
}

impl CoordinatorFixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn filesystem(mut self, fs: Arc<dyn Filesystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn store(mut self, store: Arc<dyn RelationalStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn code_cache(mut self, code_cache: CodeCacheProvider) -> Self {
        self.code_cache = code_cache;
        self
    }

    pub fn configure(mut self, f: impl FnOnce(&mut CoordinatorConfig)) -> Self {
        f(&mut self.config);
        self
    }

    /// Use `root` instead of a directory inside the fixture's tempdir
    pub fn cache_root(mut self, root: PathBuf) -> Self {
        self.cache_root = Some(root);
        self
    }

    /// Leave the cache root uncreated
    pub fn without_cache_root(mut self) -> Self {
        self.populate = false;
        self
    }

    /// Build with the hard reset pointed at `<tempdir>/cache` unless a root was given
    pub fn build(mut self) -> CoordinatorFixture {
        let cache_dir = tempfile::tempdir().unwrap();
        let root = self
            .cache_root
            .take()
            .unwrap_or_else(|| cache_dir.path().join("cache"));
        if self.populate {
            populate_cache(&root);
        }

        self.config.hard_reset.cache_root = root.clone();

        let registry = BackendRegistry::new();
        for backend in self.backends {
            registry.register(backend).unwrap();
        }

        let coordinator = CacheCoordinator::new(
            &self.config,
            Arc::new(registry),
            self.fs,
            self.store,
            self.code_cache,
        );

        CoordinatorFixture {
            cache_dir,
            coordinator,
            root,
        }
    }
}
