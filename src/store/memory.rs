use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

use super::{StoreAccessor, StoreError};
use crate::models::Scope;

/// In-memory store used by tests and non-Windows experimentation.
///
/// Failure injection mirrors the error taxonomy of the registry store: a
/// denied scope fails enumeration (scope-fatal), a poisoned name fails its
/// individual writes (variable-local).
#[derive(Debug, Default)]
pub struct MemoryStore {
    scopes: HashMap<Scope, IndexMap<String, String>>,
    denied_scopes: HashSet<Scope>,
    failing_writes: HashSet<String>,
    write_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scope: Scope, name: impl Into<String>, value: impl Into<String>) {
        self.scopes
            .entry(scope)
            .or_default()
            .insert(name.into(), value.into());
    }

    /// Make enumeration of a scope fail with an access error.
    pub fn deny_scope(&mut self, scope: Scope) {
        self.denied_scopes.insert(scope);
    }

    /// Make set/remove for a specific variable name fail.
    pub fn fail_writes_for(&mut self, name: impl Into<String>) {
        self.failing_writes.insert(name.into());
    }

    /// Number of set/remove calls attempted so far, including failed ones.
    pub fn write_calls(&self) -> usize {
        self.write_calls
    }

    pub fn value(&self, scope: Scope, name: &str) -> Option<&str> {
        self.scopes
            .get(&scope)
            .and_then(|vars| vars.get(name))
            .map(String::as_str)
    }

    pub fn contains(&self, scope: Scope, name: &str) -> bool {
        self.value(scope, name).is_some()
    }

    fn check_write(&mut self, scope: Scope, name: &str) -> Result<(), StoreError> {
        self.write_calls += 1;
        if self.failing_writes.contains(name) {
            return Err(StoreError::Write {
                scope,
                name: name.to_string(),
                reason: "injected write failure".to_string(),
            });
        }
        Ok(())
    }
}

impl StoreAccessor for MemoryStore {
    fn list_variable_names(&self, scope: Scope) -> Result<Vec<String>, StoreError> {
        if self.denied_scopes.contains(&scope) {
            return Err(StoreError::Access {
                scope,
                reason: "access denied".to_string(),
            });
        }
        Ok(self
            .scopes
            .get(&scope)
            .map(|vars| vars.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn get_value(&self, scope: Scope, name: &str) -> Result<String, StoreError> {
        self.value(scope, name)
            .map(str::to_string)
            .ok_or_else(|| StoreError::NotFound {
                scope,
                name: name.to_string(),
            })
    }

    fn set_value(&mut self, scope: Scope, name: &str, value: &str) -> Result<(), StoreError> {
        self.check_write(scope, name)?;
        self.scopes
            .entry(scope)
            .or_default()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn remove_value(&mut self, scope: Scope, name: &str) -> Result<(), StoreError> {
        self.check_write(scope, name)?;
        if let Some(vars) = self.scopes.get_mut(&scope) {
            vars.shift_remove(name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut store = MemoryStore::new();
        store.set_value(Scope::User, "FOO", "bar").unwrap();
        assert_eq!(store.get_value(Scope::User, "FOO").unwrap(), "bar");

        store.remove_value(Scope::User, "FOO").unwrap();
        assert!(matches!(
            store.get_value(Scope::User, "FOO"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_denied_scope_fails_enumeration() {
        let mut store = MemoryStore::new();
        store.insert(Scope::System, "A", "1");
        store.deny_scope(Scope::System);

        let err = store.list_variable_names(Scope::System).unwrap_err();
        assert!(err.is_scope_fatal());
    }

    #[test]
    fn test_injected_write_failure_is_variable_local() {
        let mut store = MemoryStore::new();
        store.insert(Scope::User, "BROKEN", "x");
        store.fail_writes_for("BROKEN");

        let err = store.set_value(Scope::User, "BROKEN", "y").unwrap_err();
        assert!(!err.is_scope_fatal());
        // The old value survives the failed write.
        assert_eq!(store.value(Scope::User, "BROKEN"), Some("x"));
    }

    #[test]
    fn test_snapshot_preserves_insertion_order() {
        let mut store = MemoryStore::new();
        store.insert(Scope::User, "B", "2");
        store.insert(Scope::User, "A", "1");

        let snapshot = store.snapshot(Scope::User).unwrap();
        let names: Vec<&String> = snapshot.keys().collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}
