//! Arrays.
//!
//! Each item is processed in its own child tracker, addressed by its
//! decimal index, so item errors carry paths such as `tags.2`. The array
//! value becomes the list of item outputs before the array's own
//! pipeline runs.

use std::sync::Arc;

use serde_json::{Map, Value};
use sieve_chain::{Chain, ChainKind};
use sieve_core::{BuildError, PathRef, TrackerId, TrackerTree};

use crate::compiled::{CompiledEntity, EntityBehavior};
use crate::generic::{ChainHooks, CompiledChain};
use crate::mapper::CompileContext;
use crate::state::ProcessState;

/// Hooks of the array kind.
#[derive(Debug, Clone, Default)]
pub struct ArrayHooks {
    items: Option<Arc<CompiledEntity>>,
}

impl ChainHooks for ArrayHooks {
    fn pre_process(&self, tree: &mut TrackerTree, id: TrackerId, state: &mut ProcessState) {
        let Some(Value::Array(_)) = tree[id].value() else {
            tree[id].add_error("array/type", Map::new());
            return;
        };
        let Some(items) = &self.items else {
            return;
        };
        let Some(Value::Array(input)) = tree[id].take_value() else {
            return;
        };

        let mut output = Vec::with_capacity(input.len());
        let mut failing = Vec::new();
        for (index, item) in input.into_iter().enumerate() {
            let child = tree.attach_child(id, index.to_string(), Some(item));
            items.process_tracker(tree, child, state);
            if tree.subtree_has_errors(child) {
                failing.push(Value::from(index));
            }
            output.push(tree[child].value().cloned().unwrap_or(Value::Null));
        }

        tree[id].set_value(Some(Value::Array(output)));
        if !failing.is_empty() {
            let mut args = Map::new();
            args.insert("indexes".into(), Value::Array(failing));
            tree[id].add_error("array/items", args);
        }
    }

    fn references(&self) -> Vec<PathRef> {
        self.items
            .as_ref()
            .map(|items| items.references().to_vec())
            .unwrap_or_default()
    }
}

pub fn compile_array(
    chain: &Chain,
    context: &mut CompileContext,
) -> Result<Box<dyn EntityBehavior>, BuildError> {
    let items = match chain.kind() {
        ChainKind::Array { items: Some(item) } => Some(context.compile(item)?),
        _ => None,
    };
    Ok(Box::new(CompiledChain::new(chain, ArrayHooks { items })))
}
