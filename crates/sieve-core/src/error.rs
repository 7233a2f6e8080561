//! # Error Types — Build-Time Failures
//!
//! Everything in this module signals a defect in a schema definition,
//! never a defect in the data being validated. Data problems are
//! recorded on a [`ValueTracker`](crate::ValueTracker) as
//! [`TrackedError`](crate::TrackedError) values and returned, not raised.
//!
//! ## Design
//!
//! - Every variant names the offending key so the schema author can find
//!   the declaration that caused it.
//! - Scheduler errors are a separate enum because the graph is usable on
//!   its own; they convert into [`BuildError`] when raised while
//!   compiling a composite.

use thiserror::Error;

/// Errors raised by the dependency-graph scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node with this key was already registered.
    #[error("duplicate scheduler node '{key}'")]
    DuplicateNode {
        /// The key that was registered twice.
        key: String,
    },

    /// An edge referenced a node that was never registered.
    #[error("unknown scheduler node '{key}'")]
    UnknownNode {
        /// The missing key.
        key: String,
    },

    /// Linking `producer` before `consumer` would close a cycle.
    #[error("dependency cycle: '{producer}' -> '{consumer}' closes a loop")]
    Cycle {
        /// Key of the producing node.
        producer: String,
        /// Key of the consuming node.
        consumer: String,
    },

    /// The topological reduction could not order every node.
    ///
    /// Edge insertion rejects cycles, so reaching this means the graph's
    /// own bookkeeping is inconsistent.
    #[error(
        "scheduler stalled with {} unordered node(s): {}",
        remaining.len(),
        remaining.join(", ")
    )]
    Stalled {
        /// Keys still waiting on a producer when no progress was possible.
        remaining: Vec<String>,
    },
}

/// Errors raised while building or compiling a chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A step named a processor that is not in the catalogue.
    #[error("unknown processor '{key}'")]
    UnknownProcessor {
        /// The processor key that failed to resolve.
        key: String,
    },

    /// A format-parsing step was not the first step of its pipeline.
    #[error("format step '{key}' must be the first step of the pipeline: {reason}")]
    MisplacedFormatStep {
        /// The format processor key.
        key: String,
        /// Why the placement was rejected.
        reason: String,
    },

    /// Presence rules on one entity contradict each other.
    #[error("conflicting presence rules on {entity}: {reason}")]
    ConflictingPresence {
        /// Label or kind of the entity.
        entity: String,
        /// Which rules conflict.
        reason: String,
    },

    /// A configured option cannot be honoured.
    #[error("invalid option '{option}' on {entity}: {reason}")]
    InvalidOption {
        /// Label or kind of the entity.
        entity: String,
        /// The option name.
        option: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Member scheduling failed while compiling a composite.
    #[error("scheduling error: {0}")]
    Graph(#[from] GraphError),
}
