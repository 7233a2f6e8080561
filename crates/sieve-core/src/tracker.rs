//! # Value Trackers
//!
//! A [`ValueTracker`] carries one value through processing together with
//! the errors recorded against it. Trackers for composite values have
//! children, one per member or item, addressed by the segment name used
//! when the composite was processed (field names for objects, decimal
//! indexes for arrays).
//!
//! ## Arena Layout
//!
//! Children need a back-reference to their structural parent so path
//! references can be resolved against siblings. Instead of shared
//! pointers, every tracker of one processing call lives in a
//! [`TrackerTree`] arena and refers to its parent and children by
//! [`TrackerId`]. Ids are only issued by the tree that owns them.
//!
//! ## Invariants
//!
//! - No snapshot or undo: once a value is set it stays set until the next
//!   `set_value`; errors only accumulate.
//! - Path lookups never fail loudly; a missing segment yields `None`.

use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::identity::EntityId;
use crate::path::PathRef;
use crate::result::{ErrorArgs, TrackedError};

/// Handle of one tracker inside a [`TrackerTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerId(usize);

/// One value-in-progress plus its accumulated errors.
#[derive(Debug, Clone, Default)]
pub struct ValueTracker {
    value: Option<Value>,
    entity: Option<EntityId>,
    parent: Option<TrackerId>,
    segment: Option<String>,
    children: IndexMap<String, TrackerId>,
    errors: Vec<TrackedError>,
}

impl ValueTracker {
    /// The current value; `None` means undefined.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Whether the value is undefined. JSON `null` is defined.
    pub fn is_undefined(&self) -> bool {
        self.value.is_none()
    }

    /// Replace the current value.
    pub fn set_value(&mut self, value: Option<Value>) -> &mut Self {
        self.value = value;
        self
    }

    /// Move the current value out, leaving the tracker undefined.
    pub fn take_value(&mut self) -> Option<Value> {
        self.value.take()
    }

    /// The compiled entity that owns this tracker, once processing began.
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Record the owning entity. The first owner wins, so a default
    /// resolver running on the same tracker does not replace it.
    pub fn claim(&mut self, entity: EntityId) {
        if self.entity.is_none() {
            self.entity = Some(entity);
        }
    }

    /// The structural parent, if any.
    pub fn parent(&self) -> Option<TrackerId> {
        self.parent
    }

    /// The segment name this tracker is addressed by within its parent.
    pub fn segment(&self) -> Option<&str> {
        self.segment.as_deref()
    }

    /// A direct child by segment name.
    pub fn child(&self, segment: &str) -> Option<TrackerId> {
        self.children.get(segment).copied()
    }

    /// Direct children in attachment order.
    pub fn children(&self) -> impl Iterator<Item = (&str, TrackerId)> + '_ {
        self.children.iter().map(|(k, id)| (k.as_str(), *id))
    }

    /// Append a structured error.
    ///
    /// Returns the tracker so call sites can end with it.
    pub fn add_error(&mut self, key: impl Into<String>, args: ErrorArgs) -> &mut Self {
        self.errors.push(TrackedError {
            key: key.into(),
            args,
        });
        self
    }

    /// Append an already-built error.
    pub fn push_error(&mut self, error: TrackedError) -> &mut Self {
        self.errors.push(error);
        self
    }

    /// Whether this tracker holds any error of its own.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors recorded on this tracker, in order.
    pub fn errors(&self) -> &[TrackedError] {
        &self.errors
    }
}

/// An error located by its dotted path from the root tracker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Dotted path of the tracker holding the error; empty for the root.
    pub path: String,
    /// The error itself.
    #[serde(flatten)]
    pub error: TrackedError,
}

/// Arena of all trackers created during one processing call.
#[derive(Debug, Clone)]
pub struct TrackerTree {
    nodes: Vec<ValueTracker>,
}

impl Default for TrackerTree {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TrackerTree {
    /// Create a tree whose root tracks `value`.
    pub fn new(value: Option<Value>) -> Self {
        Self {
            nodes: vec![ValueTracker {
                value,
                ..ValueTracker::default()
            }],
        }
    }

    /// The root tracker's id.
    pub fn root(&self) -> TrackerId {
        TrackerId(0)
    }

    /// Number of trackers in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a tracker by id.
    pub fn get(&self, id: TrackerId) -> Option<&ValueTracker> {
        self.nodes.get(id.0)
    }

    /// Create a child tracker under `parent`, addressed by `segment`.
    ///
    /// Attaching the same segment twice re-points the segment at the new
    /// tracker; the earlier one stays in the arena but is unreachable.
    pub fn attach_child(
        &mut self,
        parent: TrackerId,
        segment: impl Into<String>,
        value: Option<Value>,
    ) -> TrackerId {
        let segment = segment.into();
        let id = TrackerId(self.nodes.len());
        self.nodes.push(ValueTracker {
            value,
            parent: Some(parent),
            segment: Some(segment.clone()),
            ..ValueTracker::default()
        });
        self[parent].children.insert(segment, id);
        id
    }

    /// Walk `segments` through child trackers starting at `from`.
    pub fn by_path<S: AsRef<str>>(&self, from: TrackerId, segments: &[S]) -> Option<TrackerId> {
        segments
            .iter()
            .try_fold(from, |at, segment| self.get(at)?.child(segment.as_ref()))
    }

    /// Resolve a path reference for the tracker `from`.
    ///
    /// Lookup starts at `from`'s parent (its siblings) and moves outward
    /// through the ancestors until one of them has a child named by the
    /// first segment. The remaining segments are walked from there; any
    /// miss yields `None`.
    pub fn resolve(&self, from: TrackerId, path: &PathRef) -> Option<&Value> {
        self.resolve_in(self.get(from)?.parent, path)
    }

    /// Resolve a path reference starting in an explicit scope.
    pub fn resolve_in(&self, scope: Option<TrackerId>, path: &PathRef) -> Option<&Value> {
        let first = path.first()?;
        let mut scope = scope;
        while let Some(id) = scope {
            let tracker = self.get(id)?;
            if tracker.child(first).is_some() {
                let found = self.by_path(id, path.segments())?;
                return self[found].value();
            }
            scope = tracker.parent;
        }
        None
    }

    /// Segments from the root down to `id`.
    pub fn path_of(&self, id: TrackerId) -> Vec<String> {
        let mut segments = Vec::new();
        let mut at = Some(id);
        while let Some(current) = at {
            let Some(tracker) = self.get(current) else {
                break;
            };
            if let Some(segment) = tracker.segment() {
                segments.push(segment.to_string());
            }
            at = tracker.parent;
        }
        segments.reverse();
        segments
    }

    /// Whether `id` or any tracker below it holds an error.
    pub fn subtree_has_errors(&self, id: TrackerId) -> bool {
        match self.get(id) {
            Some(t) => t.has_errors() || t.children().any(|(_, c)| self.subtree_has_errors(c)),
            None => false,
        }
    }

    /// Every error at or below `id`, depth-first in child order.
    pub fn collect_errors(&self, id: TrackerId) -> Vec<FieldError> {
        let mut out = Vec::new();
        self.collect_into(id, &mut out);
        out
    }

    fn collect_into(&self, id: TrackerId, out: &mut Vec<FieldError>) {
        let Some(tracker) = self.get(id) else {
            return;
        };
        if tracker.has_errors() {
            let path = self.path_of(id).join(".");
            out.extend(tracker.errors().iter().map(|e| FieldError {
                path: path.clone(),
                error: e.clone(),
            }));
        }
        for (_, child) in tracker.children() {
            self.collect_into(child, out);
        }
    }
}

impl Index<TrackerId> for TrackerTree {
    type Output = ValueTracker;

    fn index(&self, id: TrackerId) -> &ValueTracker {
        &self.nodes[id.0]
    }
}

impl IndexMut<TrackerId> for TrackerTree {
    fn index_mut(&mut self, id: TrackerId) -> &mut ValueTracker {
        &mut self.nodes[id.0]
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn sample_tree() -> (TrackerTree, TrackerId, TrackerId, TrackerId) {
        // { a: 1, nested: { b: "x" } }
        let mut tree = TrackerTree::new(Some(json!({})));
        let root = tree.root();
        let a = tree.attach_child(root, "a", Some(json!(1)));
        let nested = tree.attach_child(root, "nested", Some(json!({})));
        let b = tree.attach_child(nested, "b", Some(json!("x")));
        (tree, a, nested, b)
    }

    // ── Value and error bookkeeping ──────────────────────────────────

    #[test]
    fn test_undefined_differs_from_null() {
        let mut tree = TrackerTree::new(None);
        let root = tree.root();
        assert!(tree[root].is_undefined());
        tree[root].set_value(Some(Value::Null));
        assert!(!tree[root].is_undefined());
    }

    #[test]
    fn test_add_error_accumulates_in_order() {
        let mut tree = TrackerTree::new(Some(json!(1)));
        let root = tree.root();
        tree[root]
            .add_error("first", Map::new())
            .add_error("second", Map::new());
        let keys: Vec<_> = tree[root].errors().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, ["first", "second"]);
        assert!(tree[root].has_errors());
    }

    #[test]
    fn test_claim_keeps_first_owner() {
        let mut tree = TrackerTree::new(None);
        let root = tree.root();
        tree[root].claim(EntityId(3));
        tree[root].claim(EntityId(9));
        assert_eq!(tree[root].entity(), Some(EntityId(3)));
    }

    // ── Path walking ─────────────────────────────────────────────────

    #[test]
    fn test_by_path_walks_children() {
        let (tree, _, _, b) = sample_tree();
        assert_eq!(tree.by_path(tree.root(), &["nested", "b"]), Some(b));
    }

    #[test]
    fn test_by_path_missing_segment_is_none() {
        let (tree, _, _, _) = sample_tree();
        assert_eq!(tree.by_path(tree.root(), &["nested", "zzz"]), None);
        assert_eq!(tree.by_path(tree.root(), &["a", "deeper"]), None);
    }

    #[test]
    fn test_resolve_sibling() {
        let (mut tree, a, _, _) = sample_tree();
        let c = tree.attach_child(tree.root(), "c", None);
        assert_eq!(tree.resolve(c, &PathRef::parse("a")), Some(&json!(1)));
        assert_eq!(tree.resolve(a, &PathRef::parse("nested.b")), Some(&json!("x")));
    }

    #[test]
    fn test_resolve_walks_out_to_ancestors() {
        let (tree, _, _, b) = sample_tree();
        // `b` lives in `nested`, which has no `a`; lookup moves to the root.
        assert_eq!(tree.resolve(b, &PathRef::parse("a")), Some(&json!(1)));
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let (tree, a, _, _) = sample_tree();
        assert_eq!(tree.resolve(a, &PathRef::parse("missing")), None);
        assert_eq!(tree.resolve(a, &PathRef::parse("nested.missing")), None);
        assert_eq!(tree.resolve(tree.root(), &PathRef::parse("a")), None);
    }

    #[test]
    fn test_path_of() {
        let (tree, _, _, b) = sample_tree();
        assert_eq!(tree.path_of(b), ["nested", "b"]);
        assert!(tree.path_of(tree.root()).is_empty());
    }

    // ── Error collection ─────────────────────────────────────────────

    #[test]
    fn test_collect_errors_depth_first() {
        let (mut tree, a, nested, b) = sample_tree();
        let root = tree.root();
        tree[b].add_error("inner", Map::new());
        tree[a].add_error("outer", Map::new());
        tree[root].add_error("root", Map::new());

        let collected = tree.collect_errors(root);
        let paths: Vec<_> = collected
            .iter()
            .map(|e| (e.path.as_str(), e.error.key.as_str()))
            .collect();
        assert_eq!(paths, [("", "root"), ("a", "outer"), ("nested.b", "inner")]);
        assert!(tree.subtree_has_errors(nested));
    }

    #[test]
    fn test_subtree_without_errors() {
        let (tree, _, nested, _) = sample_tree();
        assert!(!tree.subtree_has_errors(nested));
        assert!(tree.collect_errors(tree.root()).is_empty());
    }
}
