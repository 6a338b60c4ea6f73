//! Directed multigraph built from line tables

pub mod builder;
pub mod components;

pub use components::{EdgeKey, NetworkEdge, NetworkNode, NodeId};

use hashbrown::HashMap;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::Crs;

/// Directed multigraph whose nodes are coordinate-derived identities and
/// whose edges carry the rows they were built from
#[derive(Debug, Clone)]
pub struct NetworkGraph<E> {
    pub graph: DiGraph<NetworkNode, NetworkEdge<E>>,
    pub crs: Crs,
    node_lookup: HashMap<NodeId, NodeIndex>,
}

impl<E> NetworkGraph<E> {
    pub fn new(crs: Crs) -> Self {
        Self {
            graph: DiGraph::new(),
            crs,
            node_lookup: HashMap::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_lookup.get(&id).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&NetworkNode> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NetworkNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &NetworkEdge<E>> {
        self.graph.edge_weights()
    }

    pub fn edge(&self, idx: EdgeIndex) -> Option<&NetworkEdge<E>> {
        self.graph.edge_weight(idx)
    }

    /// Returns the node for `id`, inserting it at `node` if it is new
    pub(crate) fn ensure_node(&mut self, node: NetworkNode) -> NodeIndex {
        if let Some(&idx) = self.node_lookup.get(&node.id) {
            return idx;
        }
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_lookup.insert(id, idx);
        idx
    }

    /// Number of edges already running from `from` to `to`
    pub(crate) fn parallel_edges(&self, from: NodeIndex, to: NodeIndex) -> usize {
        self.graph
            .edges_connecting(from, to)
            .filter(|e| e.source() == from)
            .count()
    }
}
