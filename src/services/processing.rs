use std::fmt;

use crate::models::{Action, LIST_SEPARATOR, RawVariable, RunConfig, Scope, SweepStats};
use crate::services::cleaning::CleanerService;
use crate::store::{StoreAccessor, StoreError};

/// Why a variable is being removed; surfaced in the report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveReason {
    /// The value was empty or whitespace-only
    Empty,
    /// Every entry of the list was a duplicate, blank or missing path
    NoValidEntries,
    /// A scalar path value that no longer exists
    MissingPath,
}

impl fmt::Display for RemoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RemoveReason::Empty => "value is empty",
            RemoveReason::NoValidEntries => "no valid entries remain after cleaning",
            RemoveReason::MissingPath => "path no longer exists",
        };
        f.write_str(text)
    }
}

/// Pure per-variable decision, before any store side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Already clean, character for character
    Keep,
    /// Name is on the protected list; never touched
    Protected,
    /// Cleaned list value would exceed the size limit; old value retained
    OversizeGuard { length: usize },
    Update { new_value: String },
    Remove { reason: RemoveReason },
}

/// Outcome of processing one scope.
#[derive(Debug)]
pub struct ScopeOutcome {
    pub scope: Scope,
    pub actions: Vec<Action>,
    pub stats: SweepStats,
}

/// Orchestrates cleaning across all variables of one scope.
///
/// Per variable the decision is linear: protected-name skip, clean, size
/// guard for the designated list variable, exact-equality no-op, then update
/// or remove. Variables are independent; one outcome never influences the
/// next, and a failed store write is reported and skipped.
pub struct VariableProcessor<'a> {
    cleaner: &'a CleanerService,
    config: &'a RunConfig,
}

impl<'a> VariableProcessor<'a> {
    pub fn new(cleaner: &'a CleanerService, config: &'a RunConfig) -> Self {
        Self { cleaner, config }
    }

    /// Decide what should happen to a single variable. No side effects.
    pub fn decide(&self, variable: &RawVariable) -> Decision {
        if self.config.is_protected(&variable.name) {
            return Decision::Protected;
        }

        let mut cleaned = self.cleaner.clean(&variable.value);

        if self.config.is_list_variable(&variable.name) {
            if let Some(value) = cleaned.take() {
                // Stray separators at either end never count against the limit.
                let stripped = value.trim_matches(LIST_SEPARATOR).to_string();
                if stripped.len() > self.config.max_list_length {
                    return Decision::OversizeGuard {
                        length: stripped.len(),
                    };
                }
                cleaned = Some(stripped);
            }
        }

        match cleaned {
            Some(value) if value == variable.value => Decision::Keep,
            Some(value) => Decision::Update { new_value: value },
            None => Decision::Remove {
                reason: self.remove_reason(&variable.value),
            },
        }
    }

    fn remove_reason(&self, value: &str) -> RemoveReason {
        if value.trim().is_empty() {
            RemoveReason::Empty
        } else if value.contains(LIST_SEPARATOR) {
            RemoveReason::NoValidEntries
        } else {
            RemoveReason::MissingPath
        }
    }

    /// Read, decide and (outside preview mode) apply the whole scope.
    ///
    /// Enumeration failure is scope-fatal and propagated; everything past
    /// that point is contained per variable.
    pub fn process_scope(
        &self,
        store: &mut dyn StoreAccessor,
        scope: Scope,
    ) -> Result<ScopeOutcome, StoreError> {
        let names = store.list_variable_names(scope)?;
        tracing::info!("Processing {} scope ({} variables)", scope, names.len());

        let mut variables = Vec::with_capacity(names.len());
        for name in names {
            match store.get_value(scope, &name) {
                Ok(value) => variables.push(RawVariable::new(name, value, scope)),
                Err(err) => {
                    tracing::warn!("Cannot read {} in {} scope: {}", name, scope, err);
                }
            }
        }

        let mut stats = SweepStats::default();
        let mut actions = Vec::with_capacity(variables.len());
        for variable in &variables {
            let action = self.handle_variable(store, variable, &mut stats);
            actions.push(action);
        }

        tracing::info!("{} scope complete: {}", scope, stats.summary());
        Ok(ScopeOutcome {
            scope,
            actions,
            stats,
        })
    }

    fn handle_variable(
        &self,
        store: &mut dyn StoreAccessor,
        variable: &RawVariable,
        stats: &mut SweepStats,
    ) -> Action {
        match self.decide(variable) {
            Decision::Keep => {
                stats.unchanged += 1;
                Action::NoOp {
                    name: variable.name.clone(),
                }
            }
            Decision::Protected => {
                tracing::debug!("{} is protected, leaving as-is", variable.name);
                stats.protected += 1;
                Action::NoOp {
                    name: variable.name.clone(),
                }
            }
            Decision::OversizeGuard { length } => {
                tracing::warn!(
                    "{}: cleaned value is {} characters, which exceeds the {} limit; \
                     keeping the existing value untouched",
                    variable.name,
                    length,
                    self.config.max_list_length
                );
                stats.oversize_skips += 1;
                Action::NoOp {
                    name: variable.name.clone(),
                }
            }
            Decision::Update { new_value } => {
                tracing::info!(
                    "{} {}: updating\n  old: {}\n  new: {}",
                    variable.scope,
                    variable.name,
                    variable.value,
                    new_value
                );
                if !self.config.preview {
                    if let Err(err) =
                        store.set_value(variable.scope, &variable.name, &new_value)
                    {
                        tracing::warn!("Failed to update {}: {}", variable.name, err);
                        stats.write_failures += 1;
                    }
                }
                stats.updated += 1;
                Action::Update {
                    name: variable.name.clone(),
                    old_value: variable.value.clone(),
                    new_value,
                }
            }
            Decision::Remove { reason } => {
                tracing::info!(
                    "{} {}: removing ({}), was: {}",
                    variable.scope,
                    variable.name,
                    reason,
                    variable.value
                );
                if !self.config.preview {
                    if let Err(err) = store.remove_value(variable.scope, &variable.name) {
                        tracing::warn!("Failed to remove {}: {}", variable.name, err);
                        stats.write_failures += 1;
                    }
                }
                stats.removed += 1;
                Action::Remove {
                    name: variable.name.clone(),
                    old_value: variable.value.clone(),
                }
            }
        }
    }
}
