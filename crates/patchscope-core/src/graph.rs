//! Graph wrapper using petgraph::StableDiGraph keyed by canonical NodeId

use std::collections::HashMap;

use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};

use crate::model::{Category, NodeId};

/// An admitted node as it appears in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub category: Category,
    /// Raw label with hidden substrings removed, suffixed with the id.
    pub label: String,
    pub active: bool,
    pub state: String,
}

/// How this edge was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeOrigin {
    /// Reported by the backend as a stream/device connection.
    Connection,
    /// Inferred from a "Monitor of ..." label.
    Monitor,
    /// Inferred from matching loopback ordinals.
    Loopback,
}

impl EdgeOrigin {
    pub fn is_inferred(self) -> bool {
        !matches!(self, EdgeOrigin::Connection)
    }
}

/// A directed edge between two admitted nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub origin: EdgeOrigin,
}

impl GraphEdge {
    /// The same edge pointing the other way.
    pub fn reversed(self) -> Self {
        GraphEdge {
            from: self.to,
            to: self.from,
            origin: self.origin,
        }
    }
}

/// The routing graph: a directed multigraph over admitted nodes.
///
/// Nodes and edges iterate in insertion order. Nothing is ever removed; a
/// new graph is built whenever the routing changes.
#[derive(Clone)]
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    index: HashMap<NodeId, NodeIndex>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node. Returns false if a node with the same id already exists.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.index.contains_key(&node.id) {
            return false;
        }
        let id = node.id;
        let idx = self.inner.add_node(node);
        self.index.insert(id, idx);
        true
    }

    /// Add an edge. Returns false if either endpoint is not in the graph.
    pub fn add_edge(&mut self, edge: GraphEdge) -> bool {
        match (self.index.get(&edge.from), self.index.get(&edge.to)) {
            (Some(&from), Some(&to)) => {
                self.inner.add_edge(from, to, edge);
                true
            }
            _ => false,
        }
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.index
            .get(&id)
            .and_then(|&idx| self.inner.node_weight(idx))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx))
    }

    /// Iterate over all edges in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edge_indices()
            .filter_map(move |idx| self.inner.edge_weight(idx))
    }

    /// Check if at least one edge runs from `from` to `to`.
    pub fn has_edge_between(&self, from: NodeId, to: NodeId) -> bool {
        match (self.index.get(&from), self.index.get(&to)) {
            (Some(&a), Some(&b)) => self.inner.contains_edge(a, b),
            _ => false,
        }
    }

    /// Nodes of one category in insertion order.
    pub fn nodes_of_category(&self, category: Category) -> impl Iterator<Item = &GraphNode> {
        self.all_nodes().filter(move |n| n.category == category)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
