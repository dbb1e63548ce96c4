//! Data models for the EnvSweep tool.
//!
//! This module contains the core data structures used throughout the run:
//! - [`Scope`]: the User or System variable namespace
//! - [`RawVariable`]: a variable exactly as read from the store
//! - [`Action`]: the per-variable decision (no-op, update or remove)
//! - [`SweepStats`]: per-scope counters reported after processing
//! - [`RunConfig`]: explicit configuration threaded into every component
//! - [`SweepSettings`]: user preferences loaded from `EnvSweep Settings.yaml`
//!
//! # Architecture Note
//!
//! All state is transient and scoped to a single run. A `RawVariable` is read
//! once and never mutated in place; cleaning produces new values, and the only
//! artifacts that outlive the process are the backup files and (outside
//! preview mode) the updated store values.

pub mod settings;
pub mod variable;

pub use settings::{RunConfig, SweepOptions, SweepSettings};
pub use variable::{
    Action, LIST_SEPARATOR, LIST_VARIABLE, MAX_LIST_VALUE_LEN, RawVariable, Scope, SweepStats,
};
