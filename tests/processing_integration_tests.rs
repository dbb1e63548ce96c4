//! Integration tests for VariableProcessor against the in-memory store.
//!
//! These tests verify:
//! - Actions applied to the store (update, remove, no-op)
//! - Preview mode producing identical decisions with zero writes
//! - Per-variable write failures not aborting the scope
//! - Scope-fatal enumeration errors propagating

use envsweep::models::{Action, RunConfig, Scope};
use envsweep::services::cleaning::{CleanerService, FilesystemChecker};
use envsweep::services::processing::VariableProcessor;
use envsweep::store::{MemoryStore, StoreAccessor, StoreError};
use std::collections::HashSet;

struct FakeFilesystem {
    existing: HashSet<String>,
}

impl FilesystemChecker for FakeFilesystem {
    fn exists(&self, path: &str) -> bool {
        self.existing.contains(path)
    }
}

fn cleaner_with(paths: &[&str]) -> CleanerService {
    CleanerService::with_checker(Box::new(FakeFilesystem {
        existing: paths.iter().map(|p| p.to_string()).collect(),
    }))
}

#[test]
fn test_scope_processing_applies_updates_and_removals() {
    let mut store = MemoryStore::new();
    store.insert(Scope::User, "Path", "C:\\a;C:\\missing;C:\\a");
    store.insert(Scope::User, "OLD_TOOL", "D:\\deleted_folder");
    store.insert(Scope::User, "FLAG", "enabled");

    let cleaner = cleaner_with(&["C:\\a"]);
    let config = RunConfig::default();
    let processor = VariableProcessor::new(&cleaner, &config);

    let outcome = processor.process_scope(&mut store, Scope::User).unwrap();

    assert_eq!(outcome.stats.updated, 1);
    assert_eq!(outcome.stats.removed, 1);
    assert_eq!(outcome.stats.unchanged, 1);

    assert_eq!(store.value(Scope::User, "Path"), Some("C:\\a"));
    assert!(!store.contains(Scope::User, "OLD_TOOL"));
    assert_eq!(store.value(Scope::User, "FLAG"), Some("enabled"));
}

#[test]
fn test_clean_value_makes_no_store_write() {
    let mut store = MemoryStore::new();
    store.insert(Scope::User, "Path", "C:\\a;C:\\b");

    let cleaner = cleaner_with(&["C:\\a", "C:\\b"]);
    let config = RunConfig::default();
    let processor = VariableProcessor::new(&cleaner, &config);

    let outcome = processor.process_scope(&mut store, Scope::User).unwrap();

    assert_eq!(store.write_calls(), 0);
    assert_eq!(
        outcome.actions,
        vec![Action::NoOp {
            name: "Path".to_string()
        }]
    );
}

#[test]
fn test_preview_mode_decides_identically_but_never_writes() {
    let seed = |store: &mut MemoryStore| {
        store.insert(Scope::User, "Path", "C:\\a;;C:\\a;C:\\missing");
        store.insert(Scope::User, "STALE", "D:\\gone");
    };

    let mut live_store = MemoryStore::new();
    let mut preview_store = MemoryStore::new();
    seed(&mut live_store);
    seed(&mut preview_store);

    let cleaner = cleaner_with(&["C:\\a"]);
    let live_config = RunConfig::default();
    let mut preview_config = RunConfig::default();
    preview_config.preview = true;

    let live_outcome = VariableProcessor::new(&cleaner, &live_config)
        .process_scope(&mut live_store, Scope::User)
        .unwrap();
    let preview_outcome = VariableProcessor::new(&cleaner, &preview_config)
        .process_scope(&mut preview_store, Scope::User)
        .unwrap();

    // Same decisions in both modes
    assert_eq!(live_outcome.actions, preview_outcome.actions);
    assert_eq!(live_outcome.stats, preview_outcome.stats);

    // Live store changed, preview store byte-identical
    assert_eq!(live_store.value(Scope::User, "Path"), Some("C:\\a"));
    assert_eq!(
        preview_store.value(Scope::User, "Path"),
        Some("C:\\a;;C:\\a;C:\\missing")
    );
    assert!(preview_store.contains(Scope::User, "STALE"));
    assert_eq!(preview_store.write_calls(), 0);
}

#[test]
fn test_write_failure_is_reported_and_processing_continues() {
    let mut store = MemoryStore::new();
    store.insert(Scope::User, "BROKEN", "C:\\x;C:\\missing");
    store.insert(Scope::User, "AFTER", "D:\\gone");
    store.fail_writes_for("BROKEN");

    let cleaner = cleaner_with(&["C:\\x"]);
    let config = RunConfig::default();
    let processor = VariableProcessor::new(&cleaner, &config);

    let outcome = processor.process_scope(&mut store, Scope::User).unwrap();

    assert_eq!(outcome.stats.write_failures, 1);
    // The failing variable keeps its old value, the next one is still handled.
    assert_eq!(store.value(Scope::User, "BROKEN"), Some("C:\\x;C:\\missing"));
    assert!(!store.contains(Scope::User, "AFTER"));
}

#[test]
fn test_denied_scope_is_fatal_for_that_scope_only() {
    let mut store = MemoryStore::new();
    store.insert(Scope::System, "A", "1");
    store.deny_scope(Scope::System);
    store.insert(Scope::User, "STALE", "D:\\gone");

    let cleaner = cleaner_with(&[]);
    let config = RunConfig::default();
    let processor = VariableProcessor::new(&cleaner, &config);

    let err = processor.process_scope(&mut store, Scope::System).unwrap_err();
    assert!(matches!(err, StoreError::Access { .. }));

    // User scope is unaffected by the System failure.
    let outcome = processor.process_scope(&mut store, Scope::User).unwrap();
    assert_eq!(outcome.stats.removed, 1);
}

#[test]
fn test_oversize_list_keeps_original_value_in_store() {
    let entry_a = format!("C:\\{}", "a".repeat(20000));
    let entry_b = format!("C:\\{}", "b".repeat(20000));
    let original = format!("{};{};{}", entry_a, entry_b, entry_a);

    let mut store = MemoryStore::new();
    store.insert(Scope::User, "Path", original.clone());

    let cleaner = cleaner_with(&[&entry_a, &entry_b]);
    let config = RunConfig::default();
    let processor = VariableProcessor::new(&cleaner, &config);

    let outcome = processor.process_scope(&mut store, Scope::User).unwrap();

    assert_eq!(outcome.stats.oversize_skips, 1);
    assert_eq!(store.write_calls(), 0);
    // No truncation: the store still holds the overlong original.
    assert_eq!(store.value(Scope::User, "Path"), Some(original.as_str()));
}

#[test]
fn test_protected_variables_are_left_alone() {
    let mut store = MemoryStore::new();
    store.insert(Scope::User, "PATHEXT", ".COM;.EXE;.BAT;.CMD");

    let cleaner = cleaner_with(&[]);
    let config = RunConfig::default();
    let processor = VariableProcessor::new(&cleaner, &config);

    let outcome = processor.process_scope(&mut store, Scope::User).unwrap();

    assert_eq!(outcome.stats.protected, 1);
    assert_eq!(
        store.value(Scope::User, "PATHEXT"),
        Some(".COM;.EXE;.BAT;.CMD")
    );
}
