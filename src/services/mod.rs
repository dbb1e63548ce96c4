//! Services module - Pure business logic for environment variable cleaning.
//!
//! This module contains the core logic of the tool, free of any registry or
//! platform dependency so it can be tested against fakes:
//!
//! - [`CleanerService`]: maps a raw variable value to its cleaned form or an
//!   absence signal. Splits, trims, deduplicates and existence-filters list
//!   values; trims scalars and drops stale path-shaped ones. Filesystem
//!   existence checks go through the injectable [`FilesystemChecker`] trait.
//!
//! - [`VariableProcessor`]: iterates one scope's variables, turns each into a
//!   [`Decision`] and then an [`Action`](crate::models::Action), enforces the
//!   size guard on the designated list variable, applies changes through the
//!   store unless preview mode is on, and accumulates
//!   [`SweepStats`](crate::models::SweepStats).
//!
//! - [`common_names`]: set intersection of variable names across scopes for
//!   the final informational report.
//!
//! # Design Philosophy
//!
//! - **Stateless**: each run reads the store once; decisions for one variable
//!   never depend on another variable's outcome
//! - **Testable**: the filesystem and the store are both trait seams
//! - **Synchronous**: one-shot maintenance run, no async machinery

pub mod cleaning;
pub mod compare;
pub mod processing;

pub use cleaning::{CleanerService, FilesystemChecker, RealFilesystem};
pub use compare::common_names;
pub use processing::{Decision, RemoveReason, ScopeOutcome, VariableProcessor};
