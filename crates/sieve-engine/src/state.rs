//! # Per-Call State
//!
//! [`ProcessState`] travels alongside the tracker tree for the duration
//! of one processing call. Compiled entities hold no per-call data of
//! their own; anything that must survive between nested calls lives
//! here.

use serde::Serialize;

/// Transient bookkeeping for one processing call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessState {
    depth: usize,
    max_depth: usize,
    steps_executed: usize,
}

impl ProcessState {
    /// A fresh state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth of kind-specific processing.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Deepest nesting reached so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Pipeline steps invoked so far.
    pub fn steps_executed(&self) -> usize {
        self.steps_executed
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub(crate) fn record_step(&mut self) {
        self.steps_executed += 1;
    }
}
