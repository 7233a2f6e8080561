//! # Pipeline Executor
//!
//! [`CompiledChain`] is the [`EntityBehavior`] shared by every chain kind.
//! It runs the pipeline between two kind hooks:
//!
//! ```text
//! format step? ──▶ pre_process ──▶ step 1 ──▶ step 2 ──▶ … ──▶ post_process
//!       │               │             │          │
//!       └───────────────┴─────────────┴──────────┴──▶ any error: stop
//! ```
//!
//! The format step, when the pipeline starts with one, runs before
//! `pre_process` so that the type check sees the parsed value.
//!
//! ## Step Semantics
//!
//! - Reference arguments are resolved from the tracker's scope at the
//!   moment the step runs. A missing target resolves to `None`.
//! - The step's value is stored even when the step fails.
//! - The first error ends the pipeline; later steps never run.

use serde_json::{Map, Value};
use sieve_chain::{Arg, Chain, Processor};
use sieve_core::{PathRef, TrackerId, TrackerTree};

use crate::compiled::EntityBehavior;
use crate::state::ProcessState;

/// Kind-specific hooks around the pipeline. Every hook defaults to a
/// no-op.
pub trait ChainHooks: Send + Sync + std::fmt::Debug {
    /// Shape check and structural processing. Any error it records stops
    /// the pipeline.
    fn pre_process(&self, _tree: &mut TrackerTree, _id: TrackerId, _state: &mut ProcessState) {}

    /// Conversion after a clean pipeline.
    fn post_process(&self, _tree: &mut TrackerTree, _id: TrackerId, _state: &mut ProcessState) {}

    /// References looked up by the hooks that must be produced elsewhere.
    fn references(&self) -> Vec<PathRef> {
        Vec::new()
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl ChainHooks for NoHooks {}

#[derive(Debug, Clone)]
struct CompiledStep {
    processor: Processor,
    args: Vec<Arg>,
}

impl CompiledStep {
    fn run(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState) {
        let args: Vec<Option<Value>> = self
            .args
            .iter()
            .map(|arg| match arg {
                Arg::Literal(value) => Some(value.clone()),
                Arg::Ref(path) => tree.resolve(id, path).cloned(),
            })
            .collect();
        let current = tree[id].value().cloned().unwrap_or(Value::Null);

        let result = self.processor.call(&current, &args);
        state.record_step();
        tracing::trace!(
            processor = self.processor.key(),
            fail = result.fail,
            "pipeline step executed"
        );

        let tracker = &mut tree[id];
        tracker.set_value(Some(result.value));
        if result.fail && result.errors.is_empty() {
            let mut args = Map::new();
            args.insert("processor".into(), Value::from(self.processor.key()));
            tracker.add_error("generic/failed", args);
        }
        for error in result.errors {
            tracker.push_error(error);
        }
    }
}

/// A compiled pipeline wrapped in kind hooks.
#[derive(Debug)]
pub struct CompiledChain<H> {
    format: Option<CompiledStep>,
    steps: Vec<CompiledStep>,
    hooks: H,
}

impl<H: ChainHooks> CompiledChain<H> {
    /// Compile the pipeline of `chain` around `hooks`.
    pub fn new(chain: &Chain, hooks: H) -> Self {
        let mut steps: Vec<CompiledStep> = chain
            .pipeline()
            .iter()
            .map(|step| CompiledStep {
                processor: step.processor().clone(),
                args: step.args().to_vec(),
            })
            .collect();
        let format = match steps.first() {
            Some(first) if first.processor.is_format() => Some(steps.remove(0)),
            _ => None,
        };
        Self {
            format,
            steps,
            hooks,
        }
    }

    /// The hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Number of compiled steps, format step included.
    pub fn len(&self) -> usize {
        self.steps.len() + usize::from(self.format.is_some())
    }

    /// Whether the pipeline has no step.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H: ChainHooks> EntityBehavior for CompiledChain<H> {
    fn process(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState) {
        if let Some(format) = &self.format {
            format.run(tree, id, state);
            if tree[id].has_errors() {
                return;
            }
        }

        self.hooks.pre_process(tree, id, state);
        if tree[id].has_errors() {
            return;
        }

        for step in &self.steps {
            step.run(tree, id, state);
            if tree[id].has_errors() {
                return;
            }
        }

        self.hooks.post_process(tree, id, state);
    }

    fn references(&self) -> Vec<PathRef> {
        let mut refs: Vec<PathRef> = self
            .format
            .iter()
            .chain(&self.steps)
            .flat_map(|step| step.args.iter().filter_map(Arg::as_path))
            .cloned()
            .collect();
        refs.extend(self.hooks.references());
        refs
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
