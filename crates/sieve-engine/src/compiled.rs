//! # Compiled Entities
//!
//! A [`CompiledEntity`] is the executable counterpart of one chain. It
//! keeps the source chain read-only, shares the mapper that built it,
//! and carries a kind-specific [`EntityBehavior`].
//!
//! ## Processing
//!
//! ```text
//! claim tracker ──▶ reference? ──yes──▶ replace value with lookup
//!                        │
//!                        ▼
//!                  undefined? ──yes──▶ required? ──yes──▶ generic/required
//!                        │                  │ no
//!                        │                  ▼
//!                        │            default (literal, or resolver)
//!                        │ no
//!                        ▼
//!                  forbidden? ──yes──▶ generic/forbidden
//!                        │ no
//!                        ▼
//!                  kind behaviour (a reference's own pipeline)
//! ```
//!
//! A substituted default is taken as-is; it is not run through the
//! pipeline.

use std::sync::Arc;

use serde_json::{Map, Value};
use sieve_chain::{Chain, DefaultValue, KindTag};
use sieve_core::{EntityId, PathRef, TrackerId, TrackerTree};

use crate::generic::{CompiledChain, NoHooks};
use crate::mapper::CompilationMapper;
use crate::outcome::Processed;
use crate::state::ProcessState;

/// Kind-specific processing, run once presence rules have passed and the
/// tracked value is defined.
pub trait EntityBehavior: Send + Sync + std::fmt::Debug {
    /// Process the defined value held by tracker `id`.
    fn process(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState);

    /// Path references this behaviour looks up while processing and that
    /// must be produced outside of it.
    fn references(&self) -> Vec<PathRef> {
        Vec::new()
    }
}

/// What an entity does after its presence rules.
#[derive(Debug)]
pub(crate) enum Body {
    /// Nothing: the value passes through.
    Base,
    /// The value is replaced by a lookup before presence rules run, then
    /// the reference's own steps run on the resolved value.
    Reference {
        path: PathRef,
        pipeline: CompiledChain<NoHooks>,
    },
    /// Kind-specific behaviour from the mapper's table.
    Behavior(Box<dyn EntityBehavior>),
}

impl Body {
    fn behavior(&self) -> Option<&dyn EntityBehavior> {
        match self {
            Self::Base => None,
            Self::Reference { pipeline, .. } => Some(pipeline),
            Self::Behavior(behavior) => Some(behavior.as_ref()),
        }
    }
}

/// The executable counterpart of one chain.
pub struct CompiledEntity {
    id: EntityId,
    source: Chain,
    mapper: Arc<CompilationMapper>,
    default_compiled: Option<Arc<CompiledEntity>>,
    body: Body,
    references: Vec<PathRef>,
}

impl CompiledEntity {
    pub(crate) fn new(
        id: EntityId,
        source: Chain,
        mapper: Arc<CompilationMapper>,
        default_compiled: Option<Arc<CompiledEntity>>,
        body: Body,
    ) -> Self {
        let mut references: Vec<PathRef> = Vec::new();
        let mut push = |path: &PathRef| {
            if !references.contains(path) {
                references.push(path.clone());
            }
        };
        if let Body::Reference { path, .. } = &body {
            push(path);
        }
        if let Some(DefaultValue::Ref(path)) = &source.props().default {
            push(path);
        }
        if let Some(behavior) = body.behavior() {
            behavior.references().iter().for_each(&mut push);
        }

        Self {
            id,
            source,
            mapper,
            default_compiled,
            body,
            references,
        }
    }

    /// Identity within the compiled tree.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The chain this entity was compiled from.
    pub fn source(&self) -> &Chain {
        &self.source
    }

    /// The kind of the source chain.
    pub fn tag(&self) -> KindTag {
        self.source.tag()
    }

    /// The mapper shared by the compiled tree.
    pub fn mapper(&self) -> &Arc<CompilationMapper> {
        &self.mapper
    }

    /// Whether the default is resolved from another value.
    pub fn has_default_resolver(&self) -> bool {
        self.default_compiled.is_some()
    }

    /// Every path reference this entity resolves while processing,
    /// including its own target if it is a reference and any reference
    /// escaping from composite members.
    pub fn references(&self) -> &[PathRef] {
        &self.references
    }

    /// Process `input` in a fresh tracker tree.
    pub fn process(&self, input: Option<Value>) -> Processed {
        let mut tree = TrackerTree::new(input);
        let mut state = ProcessState::new();
        let root = tree.root();
        self.process_tracker(&mut tree, root, &mut state);
        Processed::new(tree, state)
    }

    /// Process a defined value in a fresh tracker tree.
    pub fn process_value(&self, input: Value) -> Processed {
        self.process(Some(input))
    }

    /// Process the value held by tracker `id` in an existing tree.
    ///
    /// Errors are recorded on the tree; nothing is returned because the
    /// caller already owns the tracker.
    pub fn process_tracker(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState) {
        tree[id].claim(self.id);

        if let Body::Reference { path, .. } = &self.body {
            let resolved = tree.resolve(id, path).cloned();
            tree[id].set_value(resolved);
        }

        let props = self.source.props();
        if tree[id].is_undefined() {
            if props.required {
                tree[id].add_error("generic/required", Map::new());
                return;
            }
            match (&self.default_compiled, &props.default) {
                (Some(resolver), _) => resolver.process_tracker(tree, id, state),
                (None, Some(DefaultValue::Literal(value))) => {
                    tree[id].set_value(Some(value.clone()));
                }
                _ => {}
            }
            return;
        }

        if props.forbidden {
            tree[id].add_error("generic/forbidden", Map::new());
            return;
        }

        if let Some(behavior) = self.body.behavior() {
            state.enter();
            behavior.process(tree, id, state);
            state.leave();
        }
    }
}

impl std::fmt::Debug for CompiledEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledEntity")
            .field("id", &self.id)
            .field("kind", &self.source.tag())
            .field("body", &self.body)
            .field("references", &self.references)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
