//! # Dependency Graph Scheduler
//!
//! Orders named operations so every producer runs before each of its
//! consumers. Composite entities use it to process members that refer to
//! each other's values, whatever order they were declared in.
//!
//! ## Algorithm
//!
//! ```text
//! link_nodes(p, c) ──▶ record edge ──▶ can c reach p? ──yes──▶ drop edge, GraphError::Cycle
//!                                          │ no
//!                                          ▼
//!                                   invalidate cached order
//!
//! execute(ctx) ──▶ cached order? ──no──▶ topological reduction ──▶ cache
//!                        │ yes                                      │
//!                        ▼                                          ▼
//!                 run callbacks in order ◀──────────────────────────┘
//! ```
//!
//! Cycles are rejected when the closing edge is inserted, never
//! discovered later. The reduction keeps, per node, the set of producers
//! that have not been ordered yet and repeatedly takes the first node
//! (in insertion order) whose set is empty. Running out of such nodes
//! before every node is ordered is an internal inconsistency and is
//! reported as [`GraphError::Stalled`].
//!
//! ## Concurrency
//!
//! Callbacks run one at a time on the caller's thread. The order cache
//! is a [`OnceLock`], so a fully built graph can be executed through a
//! shared reference from several threads, each with its own context.

use std::sync::OnceLock;

use indexmap::{IndexMap, IndexSet};

use crate::error::GraphError;

/// Callback invoked for a node when the graph executes.
pub type NodeCallback<C> = Box<dyn Fn(&mut C) + Send + Sync>;

/// One named operation.
pub struct GraphNode<C> {
    key: String,
    callback: Option<NodeCallback<C>>,
}

impl<C> GraphNode<C> {
    /// The node's key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether a callback is registered.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl<C> std::fmt::Debug for GraphNode<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphNode")
            .field("key", &self.key)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Named operations plus "producer before consumer" edges.
pub struct DependencyGraph<C> {
    nodes: IndexMap<String, GraphNode<C>>,
    edges: IndexSet<(String, String)>,
    order: OnceLock<Vec<String>>,
}

impl<C> Default for DependencyGraph<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for DependencyGraph<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("edges", &self.edges)
            .field("order", &self.order.get())
            .finish()
    }
}

impl<C> DependencyGraph<C> {
    /// An empty graph.
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexSet::new(),
            order: OnceLock::new(),
        }
    }

    /// Register an operation under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if `key` already exists.
    pub fn create_node(
        &mut self,
        key: impl Into<String>,
        callback: Option<NodeCallback<C>>,
    ) -> Result<&mut GraphNode<C>, GraphError> {
        let key = key.into();
        if self.nodes.contains_key(&key) {
            return Err(GraphError::DuplicateNode { key });
        }
        self.order = OnceLock::new();
        let entry = self.nodes.entry(key.clone()).or_insert(GraphNode {
            key,
            callback,
        });
        Ok(entry)
    }

    /// Fetch the node under `key`, creating it if needed.
    ///
    /// A supplied callback replaces the existing one.
    pub fn get_or_create_node(
        &mut self,
        key: impl Into<String>,
        callback: Option<NodeCallback<C>>,
    ) -> &mut GraphNode<C> {
        let key = key.into();
        if !self.nodes.contains_key(&key) {
            self.order = OnceLock::new();
        }
        let node = self.nodes.entry(key.clone()).or_insert(GraphNode {
            key,
            callback: None,
        });
        if callback.is_some() {
            node.callback = callback;
        }
        node
    }

    /// Record that `producer` must run before `consumer`.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownNode`] if either key is not registered.
    /// - [`GraphError::Cycle`] if the edge would close a loop; the edge
    ///   is not recorded and the graph is left unchanged.
    pub fn link_nodes(&mut self, producer: &str, consumer: &str) -> Result<(), GraphError> {
        for key in [producer, consumer] {
            if !self.nodes.contains_key(key) {
                return Err(GraphError::UnknownNode {
                    key: key.to_string(),
                });
            }
        }

        let edge = (producer.to_string(), consumer.to_string());
        if self.edges.contains(&edge) {
            return Ok(());
        }
        if producer == consumer || self.reaches(consumer, producer) {
            return Err(GraphError::Cycle {
                producer: edge.0,
                consumer: edge.1,
            });
        }

        self.edges.insert(edge);
        self.order = OnceLock::new();
        Ok(())
    }

    /// Depth-first reachability over the recorded edges.
    fn reaches(&self, from: &str, target: &str) -> bool {
        let mut stack = vec![from];
        let mut seen: IndexSet<&str> = IndexSet::new();
        while let Some(at) = stack.pop() {
            if at == target {
                return true;
            }
            if !seen.insert(at) {
                continue;
            }
            stack.extend(
                self.edges
                    .iter()
                    .filter(|(p, _)| p == at)
                    .map(|(_, c)| c.as_str()),
            );
        }
        false
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.nodes.contains_key(key)
    }

    /// Recorded edges as `(producer, consumer)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.edges.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// Whether a linear order is currently cached.
    pub fn has_cached_order(&self) -> bool {
        self.order.get().is_some()
    }

    /// The linear execution order, computing and caching it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Stalled`] if the reduction cannot order every
    /// node, which edge insertion is meant to make impossible.
    pub fn order(&self) -> Result<&[String], GraphError> {
        if let Some(order) = self.order.get() {
            return Ok(order.as_slice());
        }
        let computed = self.reduce()?;
        Ok(self.order.get_or_init(|| computed).as_slice())
    }

    fn reduce(&self) -> Result<Vec<String>, GraphError> {
        let mut pending: IndexMap<&str, IndexSet<&str>> = self
            .nodes
            .keys()
            .map(|k| (k.as_str(), IndexSet::new()))
            .collect();
        for (producer, consumer) in &self.edges {
            if let Some(producers) = pending.get_mut(consumer.as_str()) {
                producers.insert(producer.as_str());
            }
        }

        let mut order = Vec::with_capacity(pending.len());
        while !pending.is_empty() {
            let Some(ready) = pending
                .iter()
                .find(|(_, producers)| producers.is_empty())
                .map(|(key, _)| *key)
            else {
                return Err(GraphError::Stalled {
                    remaining: pending.keys().map(|k| k.to_string()).collect(),
                });
            };
            pending.shift_remove(ready);
            for producers in pending.values_mut() {
                producers.shift_remove(ready);
            }
            order.push(ready.to_string());
        }
        Ok(order)
    }

    /// Run every callback in dependency order with the shared `context`.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphError::Stalled`] from [`order`](Self::order);
    /// no callback runs in that case.
    pub fn execute(&self, context: &mut C) -> Result<(), GraphError> {
        let order = self.order()?;
        for key in order {
            if let Some(callback) = self.nodes.get(key).and_then(|n| n.callback.as_ref()) {
                tracing::trace!(node = %key, "executing scheduled node");
                callback(context);
            }
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    type Log = Vec<String>;

    fn logging(key: &'static str) -> Option<NodeCallback<Log>> {
        Some(Box::new(move |log: &mut Log| log.push(key.to_string())))
    }

    fn position(log: &Log, key: &str) -> usize {
        log.iter().position(|k| k == key).unwrap()
    }

    fn diamond() -> DependencyGraph<Log> {
        // Registered in reverse so insertion order alone would be wrong.
        let mut g = DependencyGraph::new();
        for key in ["D", "C", "B", "A"] {
            g.create_node(key, logging(key)).unwrap();
        }
        g.link_nodes("A", "B").unwrap();
        g.link_nodes("A", "C").unwrap();
        g.link_nodes("B", "D").unwrap();
        g.link_nodes("C", "D").unwrap();
        g
    }

    // ── Node registration ────────────────────────────────────────────

    #[test]
    fn test_duplicate_node_rejected() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.create_node("a", None).unwrap();
        let err = g.create_node("a", None).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode { key: "a".into() });
    }

    #[test]
    fn test_get_or_create_is_idempotent_and_updates_callback() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.get_or_create_node("a", None);
        assert!(!g.get_or_create_node("a", None).has_callback());
        assert!(g.get_or_create_node("a", logging("a")).has_callback());
        assert_eq!(g.len(), 1);

        let mut log = Log::new();
        g.execute(&mut log).unwrap();
        assert_eq!(log, ["a"]);
    }

    #[test]
    fn test_link_unknown_node_rejected() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.create_node("a", None).unwrap();
        let err = g.link_nodes("a", "ghost").unwrap_err();
        assert_eq!(err, GraphError::UnknownNode { key: "ghost".into() });
    }

    // ── Ordering ─────────────────────────────────────────────────────

    #[test]
    fn test_diamond_ordering() {
        let g = diamond();
        let mut log = Log::new();
        g.execute(&mut log).unwrap();

        assert_eq!(log.len(), 4);
        assert!(position(&log, "A") < position(&log, "B"));
        assert!(position(&log, "A") < position(&log, "C"));
        assert!(position(&log, "B") < position(&log, "D"));
        assert!(position(&log, "C") < position(&log, "D"));
    }

    #[test]
    fn test_unrelated_nodes_follow_insertion_order() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        for key in ["x", "y", "z"] {
            g.create_node(key, logging(key)).unwrap();
        }
        assert_eq!(g.order().unwrap(), ["x", "y", "z"]);
    }

    #[test]
    fn test_order_is_cached_and_invalidated_by_link() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.create_node("a", None).unwrap();
        g.create_node("b", None).unwrap();
        assert!(!g.has_cached_order());
        assert_eq!(g.order().unwrap(), ["a", "b"]);
        assert!(g.has_cached_order());

        g.link_nodes("b", "a").unwrap();
        assert!(!g.has_cached_order());
        assert_eq!(g.order().unwrap(), ["b", "a"]);
    }

    #[test]
    fn test_repeated_link_is_noop() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.create_node("a", None).unwrap();
        g.create_node("b", None).unwrap();
        g.link_nodes("a", "b").unwrap();
        g.link_nodes("a", "b").unwrap();
        assert_eq!(g.edges().count(), 1);
    }

    #[test]
    fn test_execute_twice_reuses_order() {
        let g = diamond();
        let mut first = Log::new();
        let mut second = Log::new();
        g.execute(&mut first).unwrap();
        g.execute(&mut second).unwrap();
        assert_eq!(first, second);
    }

    // ── Cycles ───────────────────────────────────────────────────────

    #[test]
    fn test_two_node_cycle_rejected_on_second_link() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.create_node("A", None).unwrap();
        g.create_node("B", None).unwrap();
        g.link_nodes("A", "B").unwrap();

        let err = g.link_nodes("B", "A").unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                producer: "B".into(),
                consumer: "A".into()
            }
        );
        assert!(!g.has_cached_order());
        assert_eq!(g.edges().count(), 1);
    }

    #[test]
    fn test_self_link_rejected() {
        let mut g: DependencyGraph<Log> = DependencyGraph::new();
        g.create_node("A", None).unwrap();
        assert!(matches!(g.link_nodes("A", "A"), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn test_long_cycle_rejected() {
        let mut g = diamond();
        let err = g.link_nodes("D", "A").unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
        // The graph still executes with the original edges.
        let mut log = Log::new();
        g.execute(&mut log).unwrap();
        assert_eq!(log.first().map(String::as_str), Some("A"));
    }
}
