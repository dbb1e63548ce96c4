use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length the platform accepts for the aggregated search-path value.
///
/// A cleaned `Path` value longer than this is never written back; the old
/// value is retained and a warning is emitted instead.
pub const MAX_LIST_VALUE_LEN: usize = 32767;

/// Separator between entries of a list-style variable value.
pub const LIST_SEPARATOR: char = ';';

/// Canonical name of the variable subject to the size guard.
pub const LIST_VARIABLE: &str = "Path";

/// The two Windows environment variable namespaces.
///
/// `User` lives under `HKCU\Environment`, `System` under
/// `HKLM\SYSTEM\CurrentControlSet\Control\Session Manager\Environment`.
/// System scope is only processed when the process is elevated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    User,
    System,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::User => "User",
            Scope::System => "System",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A variable as read from the store at the start of a run.
///
/// Immutable once read; cleaning always produces new values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawVariable {
    pub name: String,
    pub value: String,
    pub scope: Scope,
}

impl RawVariable {
    pub fn new(name: impl Into<String>, value: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            scope,
        }
    }
}

/// Concrete action decided for a single variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do: the value is already clean, the variable is protected,
    /// or the size guard retained the old value.
    NoOp { name: String },
    /// Replace the stored value with the cleaned one.
    Update {
        name: String,
        old_value: String,
        new_value: String,
    },
    /// Delete the variable entirely (nothing valid remained after cleaning).
    Remove { name: String, old_value: String },
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Action::NoOp { name } => name,
            Action::Update { name, .. } => name,
            Action::Remove { name, .. } => name,
        }
    }

    /// True for actions that would change the store when applied.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Action::NoOp { .. })
    }
}

/// Counters accumulated while processing one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub unchanged: usize,
    pub updated: usize,
    pub removed: usize,
    pub protected: usize,
    /// Variables whose cleaned value exceeded the size limit (old value kept).
    pub oversize_skips: usize,
    /// Update/Remove applications that failed at the store.
    pub write_failures: usize,
}

impl SweepStats {
    /// Check if the scope actually needed any changes
    pub fn has_changes(&self) -> bool {
        self.updated > 0 || self.removed > 0
    }

    /// Get a summary string of what happened in this scope
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        if self.updated > 0 {
            parts.push(format!("{} updated", self.updated));
        }
        if self.removed > 0 {
            parts.push(format!("{} removed", self.removed));
        }
        if self.unchanged > 0 {
            parts.push(format!("{} unchanged", self.unchanged));
        }
        if self.protected > 0 {
            parts.push(format!("{} protected", self.protected));
        }
        if self.oversize_skips > 0 {
            parts.push(format!("{} skipped (size limit)", self.oversize_skips));
        }
        if self.write_failures > 0 {
            parts.push(format!("{} write failures", self.write_failures));
        }

        if parts.is_empty() {
            "nothing to do".to_string()
        } else {
            parts.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_labels() {
        assert_eq!(Scope::User.to_string(), "User");
        assert_eq!(Scope::System.to_string(), "System");
    }

    #[test]
    fn test_action_name_and_mutation() {
        let noop = Action::NoOp {
            name: "FOO".to_string(),
        };
        let update = Action::Update {
            name: "BAR".to_string(),
            old_value: "a;;b".to_string(),
            new_value: "a;b".to_string(),
        };
        let remove = Action::Remove {
            name: "BAZ".to_string(),
            old_value: "C:\\gone".to_string(),
        };

        assert_eq!(noop.name(), "FOO");
        assert_eq!(update.name(), "BAR");
        assert_eq!(remove.name(), "BAZ");

        assert!(!noop.is_mutation());
        assert!(update.is_mutation());
        assert!(remove.is_mutation());
    }

    #[test]
    fn test_stats_summary() {
        let stats = SweepStats {
            unchanged: 3,
            updated: 2,
            removed: 1,
            protected: 0,
            oversize_skips: 1,
            write_failures: 0,
        };

        let summary = stats.summary();
        assert!(summary.contains("2 updated"));
        assert!(summary.contains("1 removed"));
        assert!(summary.contains("3 unchanged"));
        assert!(summary.contains("1 skipped (size limit)"));
        assert!(stats.has_changes());
    }

    #[test]
    fn test_stats_empty_summary() {
        let stats = SweepStats::default();
        assert_eq!(stats.summary(), "nothing to do");
        assert!(!stats.has_changes());
    }
}
