//! # Processing Outcome
//!
//! [`Processed`] is what a top-level `process` call returns: the tracker
//! tree with the final value at its root and every error recorded along
//! the way. [`Report`] is its flattened, serializable form.

use serde::Serialize;
use serde_json::Value;
use sieve_core::{FieldError, TrackedError, TrackerTree};

use crate::state::ProcessState;

/// Result of processing one input.
#[derive(Debug, Clone)]
pub struct Processed {
    tree: TrackerTree,
    state: ProcessState,
}

impl Processed {
    pub(crate) fn new(tree: TrackerTree, state: ProcessState) -> Self {
        Self { tree, state }
    }

    /// The final value; `None` if it ended undefined.
    pub fn value(&self) -> Option<&Value> {
        self.tree[self.tree.root()].value()
    }

    /// Take the final value.
    pub fn into_value(mut self) -> Option<Value> {
        let root = self.tree.root();
        self.tree[root].take_value()
    }

    /// Errors recorded on the root tracker itself.
    pub fn errors(&self) -> &[TrackedError] {
        self.tree[self.tree.root()].errors()
    }

    /// Every error in the tree with its dotted path.
    pub fn all_errors(&self) -> Vec<FieldError> {
        self.tree.collect_errors(self.tree.root())
    }

    /// Whether no tracker in the tree holds an error.
    pub fn is_valid(&self) -> bool {
        !self.tree.subtree_has_errors(self.tree.root())
    }

    /// The tracker tree.
    pub fn tree(&self) -> &TrackerTree {
        &self.tree
    }

    /// Bookkeeping gathered during the call.
    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    /// The serializable summary.
    pub fn report(&self) -> Report {
        Report {
            valid: self.is_valid(),
            value: self.value().cloned(),
            errors: self.all_errors(),
        }
    }
}

/// Flattened outcome suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Whether processing recorded no error.
    pub valid: bool,
    /// Final value, omitted when undefined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Every error with its dotted path, depth-first.
    pub errors: Vec<FieldError>,
}
