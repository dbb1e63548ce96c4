//! Access to the underlying environment variable store.
//!
//! The processing pipeline only ever talks to the [`StoreAccessor`] trait.
//! On Windows the store is the registry ([`RegistryStore`]); tests and
//! non-Windows builds use [`MemoryStore`].

use indexmap::IndexMap;
use thiserror::Error;

use crate::models::Scope;

pub mod memory;
pub mod registry;

pub use memory::MemoryStore;
pub use registry::RegistryStore;

/// Errors raised by a store implementation.
///
/// `Access` aborts processing of the affected scope; `Write` is contained to
/// the single variable being applied.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot access {scope} environment variables: {reason}")]
    Access { scope: Scope, reason: String },

    #[error("variable {name} not found in {scope} scope")]
    NotFound { scope: Scope, name: String },

    #[error("failed to write {name} in {scope} scope: {reason}")]
    Write {
        scope: Scope,
        name: String,
        reason: String,
    },

    #[error("environment store is not available on this platform")]
    Unsupported,
}

impl StoreError {
    /// True when the whole scope should be abandoned, not just one variable.
    pub fn is_scope_fatal(&self) -> bool {
        matches!(self, StoreError::Access { .. } | StoreError::Unsupported)
    }
}

/// Contract for reading and mutating a named value in a scope.
///
/// Enumeration returns a known sequence of string keys; nothing in the core
/// depends on reflection over store object shapes.
pub trait StoreAccessor {
    fn list_variable_names(&self, scope: Scope) -> Result<Vec<String>, StoreError>;

    fn get_value(&self, scope: Scope, name: &str) -> Result<String, StoreError>;

    fn set_value(&mut self, scope: Scope, name: &str, value: &str) -> Result<(), StoreError>;

    fn remove_value(&mut self, scope: Scope, name: &str) -> Result<(), StoreError>;

    /// Snapshot an entire scope for the pre-run backup.
    ///
    /// Values that vanish between enumeration and read are skipped with a
    /// warning rather than failing the snapshot.
    fn snapshot(&self, scope: Scope) -> Result<IndexMap<String, String>, StoreError> {
        let mut snapshot = IndexMap::new();
        for name in self.list_variable_names(scope)? {
            match self.get_value(scope, &name) {
                Ok(value) => {
                    snapshot.insert(name, value);
                }
                Err(err) => {
                    tracing::warn!("Skipping {} in {} snapshot: {}", name, scope, err);
                }
            }
        }
        Ok(snapshot)
    }
}
