//! Hard reset path: direct storage wipe beneath the backends

mod common;

use cache_coordinator::backends::MemoryBackend;
use cache_coordinator::code_cache::CodeCacheProvider;
use cache_coordinator::config::{CodeCacheConfig, CodeCacheKind};
use cache_coordinator::models::{DiagnosticKind, Outcome, TagSet};
use common::*;
use std::fs;
use std::sync::Arc;

#[tokio::test]
async fn test_hard_reset_preserves_existing_sentinel() {
    let fixture = CoordinatorFixtureBuilder::new().build();
    let root = fixture.cache_root();
    fs::write(root.join(SENTINEL), "").unwrap();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    assert_eq!(entries(&root), vec![SENTINEL.to_string()]);
    assert_eq!(result.operation, "hard_reset");
    assert!(!result.has_failures());
}

#[tokio::test]
async fn test_hard_reset_does_not_create_absent_sentinel() {
    let fixture = CoordinatorFixtureBuilder::new().build();
    let root = fixture.cache_root();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    admin.clear_all(true).await.unwrap();

    assert!(root.exists());
    assert!(entries(&root).is_empty());
}

#[tokio::test]
async fn test_hard_reset_twice_is_idempotent() {
    let store = scenario_store();
    let fixture = CoordinatorFixtureBuilder::new().store(store.clone()).build();
    let root = fixture.cache_root();
    fs::write(root.join(SENTINEL), "").unwrap();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    for _ in 0..2 {
        let result = admin.clear_all(true).await.unwrap();
        assert!(!result.has_failures());
        assert_eq!(entries(&root), vec![SENTINEL.to_string()]);
        assert_eq!(store.row_count("cf_pages"), Some(0));
        assert_eq!(store.row_count("cache_hash"), Some(0));
        assert_eq!(store.row_count("users"), Some(1));
    }
}

#[tokio::test]
async fn test_hard_reset_truncates_exactly_the_cache_tables() {
    let store = scenario_store();
    let fixture = CoordinatorFixtureBuilder::new().store(store.clone()).build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    let mut tables: Vec<&str> = result
        .backends()
        .into_iter()
        .filter(|name| name.starts_with("table:"))
        .collect();
    tables.sort_unstable();
    assert_eq!(tables, vec!["table:cache_hash", "table:cf_pages"]);

    assert_eq!(store.row_count("cf_pages"), Some(0));
    assert_eq!(store.row_count("cache_hash"), Some(0));
    assert!(store.contains_entry("users", "alice"));
}

#[tokio::test]
async fn test_hard_reset_bypasses_registered_backends() {
    let runtime = Arc::new(MemoryBackend::new("runtime"));
    runtime.insert("key", "value", TagSet::default());
    let failing = Arc::new(FailingBackend::new("legacy"));

    let fixture = CoordinatorFixtureBuilder::new()
        .backend(runtime.clone())
        .backend(failing.clone())
        .build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    assert!(result.outcome_for("runtime").is_none());
    assert!(result.outcome_for("legacy").is_none());
    assert!(runtime.contains("key"));
    assert_eq!(failing.attempts(), 0);
}

#[tokio::test]
async fn test_hard_reset_continues_past_failing_table() {
    let store = scenario_store();
    store.fail_on("cf_pages");
    let fixture = CoordinatorFixtureBuilder::new().store(store.clone()).build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    assert!(result
        .outcome_for("table:cf_pages")
        .is_some_and(Outcome::is_failed));
    assert_eq!(
        result.outcome_for("table:cache_hash"),
        Some(&Outcome::Flushed)
    );
    assert_eq!(store.row_count("cache_hash"), Some(0));
    assert!(entries(&fixture.cache_root()).is_empty());
}

#[tokio::test]
async fn test_partial_wipe_is_reported_and_walk_continues() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("cache");
    let pinned = root.join("system");
    let fs_double = Arc::new(SimulatedFilesystem::new().with_undeletable(pinned.clone()));

    let fixture = CoordinatorFixtureBuilder::new()
        .filesystem(fs_double)
        .cache_root(root.clone())
        .build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    let target = format!("filesystem:{}", root.display());
    assert!(matches!(
        result.outcome_for(&target),
        Some(Outcome::Failed(reason)) if reason.contains("1 entries could not be removed")
    ));
    let diagnostics = result.diagnostics_for(&target);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::PartialWipe);
    assert_eq!(diagnostics[0].path.as_deref(), Some(pinned.as_path()));

    assert_eq!(entries(&root), vec!["system"]);
}

#[tokio::test]
async fn test_hard_reset_diagnoses_unwritable_entries_before_wiping() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("cache");
    let locked = root.join("pages/home/entry");
    let fs_double = Arc::new(SimulatedFilesystem::new().with_unwritable(locked.clone()));

    let fixture = CoordinatorFixtureBuilder::new()
        .filesystem(fs_double)
        .cache_root(root.clone())
        .build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    let target = format!("filesystem:{}", root.display());
    let diagnostics = result.diagnostics_for(&target);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::UnwritableStorage);
    assert_eq!(diagnostics[0].path.as_deref(), Some(locked.as_path()));

    assert_eq!(result.outcome_for(&target), Some(&Outcome::Flushed));
    assert!(entries(&root).is_empty());
}

#[tokio::test]
async fn test_hard_reset_skips_writability_check_when_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("cache");
    let fs_double =
        Arc::new(SimulatedFilesystem::new().with_unwritable(root.join("pages/home/entry")));

    let fixture = CoordinatorFixtureBuilder::new()
        .filesystem(fs_double)
        .cache_root(root)
        .configure(|config| config.executor.writability_precheck = false)
        .build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();
    assert!(result.diagnostics.is_empty());
}

#[tokio::test]
async fn test_missing_cache_root_is_nothing_to_wipe() {
    let fixture = CoordinatorFixtureBuilder::new().without_cache_root().build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    let target = format!("filesystem:{}", fixture.cache_root().display());
    assert_eq!(result.outcome_for(&target), Some(&Outcome::Flushed));
    assert!(result.diagnostics.is_empty());
    assert!(!fixture.cache_root().exists());
}

#[tokio::test]
async fn test_hard_reset_clears_code_cache_by_default() {
    let code_cache = CodeCacheProvider::from_config(&CodeCacheConfig {
        provider: CodeCacheKind::Compiled,
    });
    let compiled = code_cache.compiled().unwrap().clone();
    compiled.store("/srv/app/templates/index.tpl", b"compiled");

    let fixture = CoordinatorFixtureBuilder::new()
        .code_cache(code_cache)
        .build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    assert_eq!(result.backends().last(), Some(&"code-cache"));
    assert_eq!(result.outcome_for("code-cache"), Some(&Outcome::Flushed));
    assert!(compiled.is_empty());
}

#[tokio::test]
async fn test_hard_reset_can_leave_code_cache_alone() {
    let code_cache = CodeCacheProvider::from_config(&CodeCacheConfig {
        provider: CodeCacheKind::Compiled,
    });
    let compiled = code_cache.compiled().unwrap().clone();
    compiled.store("/srv/app/templates/index.tpl", b"compiled");

    let fixture = CoordinatorFixtureBuilder::new()
        .code_cache(code_cache)
        .configure(|config| config.hard_reset.include_code_cache = false)
        .build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let result = admin.clear_all(true).await.unwrap();

    assert!(result.outcome_for("code-cache").is_none());
    assert!(!compiled.is_empty());
}

#[tokio::test]
async fn test_hard_flag_is_only_valid_for_clear_all() {
    let fixture = CoordinatorFixtureBuilder::new().build();
    let admin = fixture.coordinator.authorize(&admin()).unwrap();

    let request = cache_coordinator::InvalidationRequest {
        mode: cache_coordinator::InvalidationMode::ByTags(TagSet::new(["pages"])),
        hard: true,
    };
    assert!(admin.execute(request).await.is_err());
    assert!(fixture.cache_root().join("pages/home/entry").exists());
}
