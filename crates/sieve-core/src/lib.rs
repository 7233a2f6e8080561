//! # sieve-core — Foundational Types for the Sieve Engine
//!
//! This crate is the leaf of the Sieve workspace. It holds the pieces
//! every other layer builds on and that do not know anything about
//! chains or compiled entities:
//!
//! - [`TrackerTree`] / [`ValueTracker`] — the per-call carrier of a
//!   value-in-progress and its accumulated errors, arranged as an arena
//!   so children can point back at their structural parent.
//! - [`PathRef`] — a deferred pointer to a sibling or ancestor value,
//!   resolved against a tracker tree at processing time.
//! - [`DependencyGraph`] — the scheduler that orders composite members
//!   so producers always run before their consumers.
//! - [`StepResult`] / [`TrackedError`] — the processor return contract.
//! - [`BuildError`] / [`GraphError`] — programmer errors, raised at
//!   build time and never converted into tracked data errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `sieve-*` crates.
//! - No I/O, no `unsafe`, no `.unwrap()` outside tests.

pub mod error;
pub mod graph;
pub mod identity;
pub mod path;
pub mod result;
pub mod tracker;

// Re-export primary types for ergonomic imports.
pub use error::{BuildError, GraphError};
pub use graph::{DependencyGraph, GraphNode, NodeCallback};
pub use identity::EntityId;
pub use path::PathRef;
pub use result::{ErrorArgs, StepResult, TrackedError};
pub use tracker::{FieldError, TrackerId, TrackerTree, ValueTracker};
