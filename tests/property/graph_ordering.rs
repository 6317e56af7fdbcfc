// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Dependency Ordering
//!
//! Graphs are generated acyclic by construction: node `i` may only depend
//! on nodes `j < i`. Edges pointing forward then have to be rejected as
//! cycles.

use genai_infra::domain::ResourceKind;
use genai_infra::graph::{GraphError, NodeSpec, ResourceGraph};
use proptest::prelude::*;
use std::collections::HashMap;

// ============================================================================
// Generators
// ============================================================================

fn node_name(index: usize) -> String {
    format!("Scope/Node{index}")
}

/// For each node, the indices of the earlier nodes it depends on
fn acyclic_dependencies() -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1usize..24).prop_flat_map(|count| {
        (0..count)
            .map(|i| {
                if i == 0 {
                    Just(Vec::new()).boxed()
                } else {
                    proptest::collection::vec(0..i, 0..4).boxed()
                }
            })
            .collect::<Vec<_>>()
    })
}

fn build(deps: &[Vec<usize>]) -> ResourceGraph {
    let specs = deps.iter().enumerate().map(|(i, targets)| {
        targets.iter().fold(
            NodeSpec::new(node_name(i), ResourceKind::Service),
            |spec, &t| spec.depends_on(node_name(t)),
        )
    });
    ResourceGraph::from_specs(specs).expect("generated graph is acyclic")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: every node appears after all of its dependencies
    #[test]
    fn prop_order_respects_dependencies(deps in acyclic_dependencies()) {
        let graph = build(&deps);
        let order = graph.resolve_order();
        let position: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name(), i))
            .collect();

        prop_assert_eq!(order.len(), deps.len(), "Order must contain every node exactly once");
        for (i, targets) in deps.iter().enumerate() {
            for &t in targets {
                prop_assert!(
                    position[node_name(t).as_str()] < position[node_name(i).as_str()],
                    "Dependency must precede its dependent"
                );
            }
        }
    }

    /// Property: resolution is deterministic
    #[test]
    fn prop_order_is_deterministic(deps in acyclic_dependencies()) {
        let first: Vec<String> = build(&deps)
            .resolve_order()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        let second: Vec<String> = build(&deps)
            .resolve_order()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        prop_assert_eq!(first, second);
    }

    /// Property: without edges, order equals declaration order
    #[test]
    fn prop_unconstrained_nodes_keep_declaration_order(count in 1usize..32) {
        let graph = build(&vec![Vec::new(); count]);
        let names: Vec<String> = graph
            .resolve_order()
            .iter()
            .map(|n| n.name().to_string())
            .collect();
        let expected: Vec<String> = (0..count).map(node_name).collect();
        prop_assert_eq!(names, expected);
    }

    /// Property: layers partition the nodes and never hold an edge inside one layer
    #[test]
    fn prop_layers_partition_graph(deps in acyclic_dependencies()) {
        let graph = build(&deps);
        let layers = graph.resolve_layers();
        let layer_of: HashMap<&str, usize> = layers
            .iter()
            .enumerate()
            .flat_map(|(l, nodes)| nodes.iter().map(move |n| (n.name(), l)))
            .collect();

        prop_assert_eq!(layer_of.len(), graph.len());
        for (i, targets) in deps.iter().enumerate() {
            for &t in targets {
                prop_assert!(layer_of[node_name(t).as_str()] < layer_of[node_name(i).as_str()]);
            }
        }
    }

    /// Property: an edge that would close a cycle is rejected and changes nothing
    #[test]
    fn prop_cycle_rejected_without_mutation(deps in acyclic_dependencies()) {
        let mut graph = build(&deps);
        let before = snapshot(&graph);

        // reverse of a declared edge i -> t
        let direct = deps
            .iter()
            .enumerate()
            .find_map(|(i, targets)| targets.first().map(|&t| (t, i)));
        // reverse of a two-step path i -> t -> u
        let transitive = deps.iter().enumerate().find_map(|(i, targets)| {
            targets
                .iter()
                .find_map(|&t| deps[t].first().map(|&u| (u, i)))
        });

        for (from, to) in direct.into_iter().chain(transitive) {
            let result = graph.add_dependency(&node_name(from), &node_name(to));
            let is_cycle = matches!(result, Err(GraphError::Cycle { .. }));
            prop_assert!(is_cycle, "{} -> {} must be a cycle", from, to);
            prop_assert_eq!(&snapshot(&graph), &before, "Rejected edge must not be recorded");
        }
    }
}

/// Deployment order plus every node's dependency names
fn snapshot(graph: &ResourceGraph) -> (Vec<String>, Vec<(String, Vec<String>)>) {
    let order = graph
        .resolve_order()
        .iter()
        .map(|node| node.name().to_string())
        .collect();
    let dependencies = graph
        .nodes()
        .iter()
        .map(|node| {
            let names = graph
                .dependencies_of(node.name())
                .unwrap_or_default()
                .iter()
                .map(|dep| dep.name().to_string())
                .collect();
            (node.name().to_string(), names)
        })
        .collect();
    (order, dependencies)
}

#[test]
fn test_transitive_reversal_rejected() {
    let mut graph = ResourceGraph::from_specs([
        NodeSpec::new("A", ResourceKind::Network),
        NodeSpec::new("B", ResourceKind::ComputeCluster).depends_on("A"),
        NodeSpec::new("C", ResourceKind::Service).depends_on("B"),
    ])
    .unwrap();
    let before = snapshot(&graph);

    let result = graph.add_dependency("A", "C");
    assert!(matches!(result, Err(GraphError::Cycle { .. })), "{result:?}");
    assert_eq!(snapshot(&graph), before);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_demo_dependency_set_orders_backend_before_frontend() {
    let graph = ResourceGraph::from_specs([
        NodeSpec::new("Network", ResourceKind::Network),
        NodeSpec::new("Cluster", ResourceKind::ComputeCluster).depends_on("Network"),
        NodeSpec::new("Frontend", ResourceKind::Service)
            .depends_on("Cluster")
            .depends_on("Backend"),
        NodeSpec::new("Backend", ResourceKind::Service).depends_on("Cluster"),
    ])
    .unwrap();

    let order: Vec<&str> = graph.resolve_order().iter().map(|n| n.name()).collect();
    assert_eq!(order, ["Network", "Cluster", "Backend", "Frontend"]);
}

#[test]
fn test_unrelated_services_keep_declaration_order() {
    let graph = ResourceGraph::from_specs([
        NodeSpec::new("Network", ResourceKind::Network),
        NodeSpec::new("Cluster", ResourceKind::ComputeCluster).depends_on("Network"),
        NodeSpec::new("Frontend", ResourceKind::Service).depends_on("Cluster"),
        NodeSpec::new("Backend", ResourceKind::Service).depends_on("Cluster"),
    ])
    .unwrap();

    let order: Vec<&str> = graph.resolve_order().iter().map(|n| n.name()).collect();
    assert_eq!(order, ["Network", "Cluster", "Frontend", "Backend"]);
}
