// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Dependency Graph
//!
//! An explicit DAG of declarative resource nodes. The graph is a plain
//! value: definitions hand it [`NodeSpec`]s, it never registers anything
//! through ambient state.
//!
//! # Invariants
//!
//! - Node names are unique
//! - Every edge endpoint exists
//! - Edges never close a cycle (checked incrementally on insert)
//! - A failed insert leaves the graph unchanged
//!
//! # Ordering
//!
//! [`ResourceGraph::resolve_order`] is Kahn's algorithm with a min-heap over
//! declaration indices, so unconstrained nodes keep declaration order:
//!
//! ```rust
//! use genai_infra::domain::ResourceKind;
//! use genai_infra::graph::{NodeSpec, ResourceGraph};
//!
//! let mut graph = ResourceGraph::new();
//! graph.add_node(NodeSpec::new("Network", ResourceKind::Network)).unwrap();
//! graph.add_node(NodeSpec::new("Cluster", ResourceKind::ComputeCluster).depends_on("Network")).unwrap();
//!
//! let order: Vec<_> = graph.resolve_order().iter().map(|n| n.name()).collect();
//! assert_eq!(order, ["Network", "Cluster"]);
//! ```

pub mod node;

pub use node::{NodeId, NodeSpec, ResourceNode, REF_KEY};

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use thiserror::Error;
use tracing::debug;

use crate::domain::invariants::validate_attribute_key;
use crate::domain::ValidationError;

/// Resource graph construction error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate node: {0}")]
    DuplicateNode(String),

    #[error("Unknown node: {name}{}", referenced_suffix(.referenced_by))]
    UnknownNode {
        name: String,
        referenced_by: Option<String>,
    },

    #[error("Dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

fn referenced_suffix(referenced_by: &Option<String>) -> String {
    referenced_by
        .as_ref()
        .map(|r| format!(" (referenced by {r})"))
        .unwrap_or_default()
}

impl GraphError {
    fn unknown(name: &str, referenced_by: Option<&str>) -> Self {
        Self::UnknownNode {
            name: name.to_string(),
            referenced_by: referenced_by.map(str::to_string),
        }
    }
}

/// Directed acyclic graph of resource nodes
///
/// Edge `from -> to` means *`from` depends on `to`*: `to` is emitted first.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    index: HashMap<NodeId, usize>,
    /// Outgoing dependency edges, by declaration index
    deps: Vec<Vec<usize>>,
    /// Reverse edges, by declaration index
    dependents: Vec<Vec<usize>>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a batch of specs
    ///
    /// All nodes are inserted first and edges second, so specs may
    /// reference nodes declared later in the batch.
    pub fn from_specs(specs: impl IntoIterator<Item = NodeSpec>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        let mut pending = Vec::new();

        for mut spec in specs {
            let deps = std::mem::take(&mut spec.depends_on);
            let name = spec.name.clone();
            graph.add_node(spec)?;
            pending.push((name, deps));
        }

        for (name, deps) in pending {
            for dep in deps {
                graph
                    .add_dependency(&name, &dep)
                    .map_err(|err| match err {
                        GraphError::UnknownNode { name: missing, .. } if missing == dep => {
                            GraphError::unknown(&dep, Some(&name))
                        }
                        other => other,
                    })?;
            }
        }

        Ok(graph)
    }

    /// Add a node and its declared dependencies
    ///
    /// # Errors
    /// - `DuplicateNode` if the name already exists
    /// - `UnknownNode` if a declared dependency is absent
    /// - `Cycle` if the node depends on itself
    /// - `Validation` for invalid names or attribute keys
    pub fn add_node(&mut self, spec: NodeSpec) -> Result<&ResourceNode, GraphError> {
        let id = NodeId::new(spec.name)?;
        for key in spec.attributes.keys() {
            validate_attribute_key(key)?;
        }

        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id.to_string()));
        }

        let mut dep_indices = Vec::with_capacity(spec.depends_on.len());
        for dep in &spec.depends_on {
            if dep == id.as_str() {
                return Err(GraphError::Cycle {
                    path: vec![dep.clone(), dep.clone()],
                });
            }
            let idx = self
                .lookup(dep)
                .ok_or_else(|| GraphError::unknown(dep, Some(id.as_str())))?;
            if !dep_indices.contains(&idx) {
                dep_indices.push(idx);
            }
        }

        let position = self.nodes.len();
        for &dep in &dep_indices {
            self.dependents[dep].push(position);
        }

        debug!(node = %id, kind = %spec.kind, deps = dep_indices.len(), "Added resource node");

        let dependencies = dep_indices
            .iter()
            .map(|&i| self.nodes[i].id.clone())
            .collect();
        self.nodes.push(ResourceNode {
            id: id.clone(),
            kind: spec.kind,
            attributes: spec.attributes,
            dependencies,
        });
        self.deps.push(dep_indices);
        self.dependents.push(Vec::new());
        self.index.insert(id, position);

        Ok(&self.nodes[position])
    }

    /// Declare that `from` depends on `to`
    ///
    /// Re-adding an existing edge is a no-op.
    ///
    /// # Errors
    /// - `UnknownNode` if either endpoint is absent
    /// - `Cycle` if `to` already depends (transitively) on `from`; the
    ///   graph is left unchanged
    pub fn add_dependency(&mut self, from: &str, to: &str) -> Result<(), GraphError> {
        let from_idx = self.lookup(from).ok_or_else(|| GraphError::unknown(from, None))?;
        let to_idx = self.lookup(to).ok_or_else(|| GraphError::unknown(to, None))?;

        if self.deps[from_idx].contains(&to_idx) {
            return Ok(());
        }

        if let Some(path) = self.path_between(to_idx, from_idx) {
            let mut cycle = vec![from.to_string()];
            cycle.extend(path.into_iter().map(|i| self.nodes[i].id.to_string()));
            return Err(GraphError::Cycle { path: cycle });
        }

        self.deps[from_idx].push(to_idx);
        self.dependents[to_idx].push(from_idx);
        let to_id = self.nodes[to_idx].id.clone();
        self.nodes[from_idx].dependencies.push(to_id);

        debug!(from, to, "Added dependency edge");
        Ok(())
    }

    /// Dependency path `start -> ... -> target`, if one exists
    fn path_between(&self, start: usize, target: usize) -> Option<Vec<usize>> {
        let mut parent: HashMap<usize, usize> = HashMap::new();
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(current) = stack.pop() {
            if current == target {
                let mut path = vec![current];
                let mut cursor = current;
                while let Some(&prev) = parent.get(&cursor) {
                    path.push(prev);
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for &next in &self.deps[current] {
                if !visited[next] {
                    visited[next] = true;
                    parent.insert(next, current);
                    stack.push(next);
                }
            }
        }
        None
    }

    fn lookup(&self, name: &str) -> Option<usize> {
        let id = NodeId::new(name).ok()?;
        self.index.get(&id).copied()
    }

    /// Topological order; unconstrained nodes keep declaration order
    pub fn resolve_order(&self) -> Vec<&ResourceNode> {
        let mut remaining: Vec<usize> = self.deps.iter().map(Vec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> = remaining
            .iter()
            .enumerate()
            .filter(|(_, &count)| count == 0)
            .map(|(i, _)| Reverse(i))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(Reverse(current)) = ready.pop() {
            order.push(&self.nodes[current]);
            for &dependent in &self.dependents[current] {
                remaining[dependent] -= 1;
                if remaining[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        // Acyclic by construction
        debug_assert_eq!(order.len(), self.nodes.len());
        order
    }

    /// Group nodes into layers that can be deployed concurrently
    ///
    /// A node's layer is one past the deepest of its dependencies; within a
    /// layer nodes keep declaration order.
    pub fn resolve_layers(&self) -> Vec<Vec<&ResourceNode>> {
        let mut depth = vec![0usize; self.nodes.len()];
        let mut layers: Vec<Vec<usize>> = Vec::new();

        for node in self.resolve_order() {
            let idx = self.index[&node.id];
            let level = self.deps[idx]
                .iter()
                .map(|&dep| depth[dep] + 1)
                .max()
                .unwrap_or(0);
            depth[idx] = level;
            if layers.len() <= level {
                layers.resize_with(level + 1, Vec::new);
            }
            layers[level].push(idx);
        }

        layers
            .into_iter()
            .map(|mut layer| {
                layer.sort_unstable();
                layer.into_iter().map(|i| &self.nodes[i]).collect()
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ResourceNode> {
        self.lookup(name).map(|i| &self.nodes[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Direct dependencies of a node
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<&ResourceNode>, GraphError> {
        let idx = self.lookup(name).ok_or_else(|| GraphError::unknown(name, None))?;
        Ok(self.deps[idx].iter().map(|&i| &self.nodes[i]).collect())
    }

    /// Nodes that directly depend on a node
    pub fn dependents_of(&self, name: &str) -> Result<Vec<&ResourceNode>, GraphError> {
        let idx = self.lookup(name).ok_or_else(|| GraphError::unknown(name, None))?;
        Ok(self.dependents[idx].iter().map(|&i| &self.nodes[i]).collect())
    }

    /// Everything a node depends on, directly or not, in declaration order
    pub fn transitive_dependencies(&self, name: &str) -> Result<Vec<&ResourceNode>, GraphError> {
        let idx = self.lookup(name).ok_or_else(|| GraphError::unknown(name, None))?;
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = self.deps[idx].clone();
        while let Some(current) = stack.pop() {
            if !seen[current] {
                seen[current] = true;
                stack.extend(&self.deps[current]);
            }
        }
        Ok(seen
            .iter()
            .enumerate()
            .filter(|(_, &hit)| hit)
            .map(|(i, _)| &self.nodes[i])
            .collect())
    }

    /// Nodes in declaration order
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.deps.iter().map(Vec::len).sum()
    }
}
