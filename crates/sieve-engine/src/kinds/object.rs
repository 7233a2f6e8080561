//! # Objects
//!
//! Members are processed as child trackers named by field. Because a
//! member may refer to a sibling's *processed* value, members run in the
//! order computed by a [`DependencyGraph`] rather than in declaration
//! order:
//!
//! - Each member is a node.
//! - A reference whose first segment names a sibling links that sibling
//!   before the referring member.
//! - A reference whose first segment is the object's own name in its
//!   parent re-enters the object: `profile.name` seen from inside
//!   `profile` links the member `name`.
//! - Any other reference escapes to the enclosing scope and is reported
//!   by [`ChainHooks::references`] so the parent composite can order it.
//!
//! The graph is built and its order cached while compiling; a cycle
//! between members is a [`BuildError`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use sieve_chain::{Chain, ChainKind, UnknownKeys};
use sieve_core::{BuildError, DependencyGraph, GraphError, PathRef, TrackerId, TrackerTree};

use crate::compiled::{CompiledEntity, EntityBehavior};
use crate::generic::{ChainHooks, CompiledChain};
use crate::mapper::CompileContext;
use crate::state::ProcessState;

/// Context handed to member callbacks while the schedule executes.
///
/// The tree and state are moved in for the duration of the run and
/// moved back out afterwards.
#[derive(Debug)]
pub struct MemberPass {
    tree: TrackerTree,
    state: ProcessState,
    object: TrackerId,
}

impl MemberPass {
    fn run(&mut self, name: &str, member: &CompiledEntity) {
        let Some(child) = self.tree[self.object].child(name) else {
            return;
        };
        tracing::trace!(member = name, "processing scheduled member");
        member.process_tracker(&mut self.tree, child, &mut self.state);
    }
}

/// Hooks of the object kind.
#[derive(Debug)]
pub struct ObjectHooks {
    members: IndexMap<String, Arc<CompiledEntity>>,
    schedule: DependencyGraph<MemberPass>,
    unknown_keys: UnknownKeys,
    escaping: Vec<PathRef>,
}

impl ObjectHooks {
    /// Compiled members in declaration order.
    pub fn members(&self) -> &IndexMap<String, Arc<CompiledEntity>> {
        &self.members
    }

    /// The member schedule.
    pub fn schedule(&self) -> &DependencyGraph<MemberPass> {
        &self.schedule
    }

    fn run_schedule(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState) {
        let mut pass = MemberPass {
            tree: std::mem::take(tree),
            state: std::mem::take(state),
            object: id,
        };
        let outcome = self.schedule.execute(&mut pass);
        *tree = pass.tree;
        *state = pass.state;

        if let Err(err) = outcome {
            tracing::error!(error = %err, "object member schedule failed");
            let mut args = Map::new();
            args.insert("reason".into(), Value::from(err.to_string()));
            tree[id].add_error("object/schedule", args);
        }
    }
}

impl ChainHooks for ObjectHooks {
    fn pre_process(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState) {
        let Some(Value::Object(_)) = tree[id].value() else {
            tree[id].add_error("object/type", Map::new());
            return;
        };
        let Some(Value::Object(mut input)) = tree[id].take_value() else {
            return;
        };

        for name in self.members.keys() {
            let value = input.remove(name.as_str());
            tree.attach_child(id, name.clone(), value);
        }
        // Whatever is left has no member.
        let unknown = input;

        self.run_schedule(tree, id, state);
        if tree[id].has_errors() {
            return;
        }

        let mut output = Map::new();
        let mut failing = Vec::new();
        for name in self.members.keys() {
            let Some(child) = tree[id].child(name) else {
                continue;
            };
            if tree.subtree_has_errors(child) {
                failing.push(Value::from(name.as_str()));
            }
            if let Some(value) = tree[child].value() {
                output.insert(name.clone(), value.clone());
            }
        }

        let mut rejected = Vec::new();
        match self.unknown_keys {
            UnknownKeys::Strip => {}
            UnknownKeys::Allow => output.extend(unknown),
            UnknownKeys::Forbid => {
                rejected.extend(unknown.into_iter().map(|(key, _)| Value::String(key)));
            }
        }

        tree[id].set_value(Some(Value::Object(output)));
        if !failing.is_empty() {
            let mut args = Map::new();
            args.insert("fields".into(), Value::Array(failing));
            tree[id].add_error("object/members", args);
        }
        if !rejected.is_empty() {
            let mut args = Map::new();
            args.insert("keys".into(), Value::Array(rejected));
            tree[id].add_error("object/unknown-keys", args);
        }
    }

    fn references(&self) -> Vec<PathRef> {
        self.escaping.clone()
    }
}

pub fn compile_object(
    chain: &Chain,
    context: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    let own_name = context.member().map(str::to_string);
    let mut members = IndexMap::new();
    if let ChainKind::Object { fields } = chain.kind() {
        for (name, field) in fields {
            members.insert(name.clone(), context.compile_member(name, field)?);
        }
    }

    let mut schedule: DependencyGraph<MemberPass> = DependencyGraph::new();
    for (name, member) in &members {
        let key = name.clone();
        let member = Arc::clone(member);
        schedule.create_node(
            name.clone(),
            Some(Box::new(move |pass: &mut MemberPass| pass.run(&key, &member))),
        )?;
    }

    let mut escaping: Vec<PathRef> = Vec::new();
    for (name, member) in &members {
        for path in member.references() {
            match path.first() {
                // A member reaching back into itself is ordered by its own kind.
                Some(producer) if producer == name.as_str() => {}
                Some(producer) if members.contains_key(producer) => {
                    schedule.link_nodes(producer, name)?;
                }
                Some(first) if own_name.as_deref() == Some(first) => match path.segments().get(1) {
                    Some(producer) if members.contains_key(producer.as_str()) => {
                        schedule.link_nodes(producer, name)?;
                    }
                    // Resolves to nothing at run time.
                    Some(_) => {}
                    None => {
                        return Err(GraphError::Cycle {
                            producer: first.to_string(),
                            consumer: name.clone(),
                        }
                        .into());
                    }
                },
                _ if escaping.contains(path) => {}
                _ => escaping.push(path.clone()),
            }
        }
    }

    let order = schedule.order()?;
    tracing::debug!(object = %chain.display_name(), order = ?order, "scheduled object members");

    let hooks = ObjectHooks {
        members,
        schedule,
        unknown_keys: chain.props().unknown_keys,
        escaping,
    };
    Ok(Box::new(CompiledChain::new(chain, hooks)))
}

// ─── Tests ───────────────────────────────────────────────────────────
