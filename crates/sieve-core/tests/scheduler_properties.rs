//! Property tests for the dependency-graph scheduler.
//!
//! Random acyclic graphs are generated by only ever linking a
//! lower-numbered node to a higher-numbered one, then registering the
//! nodes in a shuffled order. Whatever the registration order, every
//! execution must respect every recorded edge.

use proptest::prelude::*;
use sieve_core::{DependencyGraph, GraphError, NodeCallback};

fn recorder(key: String) -> Option<NodeCallback<Vec<String>>> {
    Some(Box::new(move |log: &mut Vec<String>| log.push(key.clone())))
}

fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<usize>)> {
    (2usize..12).prop_flat_map(|n| {
        let edges = proptest::collection::vec((0..n, 0..n), 0..(n * 2)).prop_map(|pairs| {
            pairs
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
                .collect::<Vec<_>>()
        });
        let registration = Just((0..n).collect::<Vec<_>>()).prop_shuffle();
        (Just(n), edges, registration)
    })
}

proptest! {
    #[test]
    fn prop_execution_respects_every_edge((n, edges, registration) in dag_strategy()) {
        let mut graph = DependencyGraph::new();
        for i in &registration {
            graph.create_node(format!("n{i}"), recorder(format!("n{i}"))).unwrap();
        }
        for (a, b) in &edges {
            graph.link_nodes(&format!("n{a}"), &format!("n{b}")).unwrap();
        }

        let mut log = Vec::new();
        graph.execute(&mut log).unwrap();
        prop_assert_eq!(log.len(), n);

        let pos = |key: &str| log.iter().position(|k| k == key).unwrap();
        for (a, b) in &edges {
            let (key_a, key_b) = (format!("n{a}"), format!("n{b}"));
            prop_assert!(pos(&key_a) < pos(&key_b));
        }
    }

    #[test]
    fn prop_back_edge_on_a_chain_is_a_cycle(n in 2usize..10, back in 0usize..10) {
        let mut graph: DependencyGraph<()> = DependencyGraph::new();
        for i in 0..n {
            graph.create_node(format!("n{i}"), None).unwrap();
        }
        for i in 1..n {
            graph.link_nodes(&format!("n{}", i - 1), &format!("n{i}")).unwrap();
        }
        let target = back % (n - 1);
        let err = graph
            .link_nodes(&format!("n{}", n - 1), &format!("n{target}"))
            .unwrap_err();
        let is_cycle = matches!(err, GraphError::Cycle { .. });
        prop_assert!(is_cycle);
        prop_assert!(!graph.has_cached_order());
    }
}
