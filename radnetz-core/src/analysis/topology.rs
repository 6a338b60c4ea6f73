//! Dangling nodes and connected components of a network graph

use geo::{Euclidean, Length};
use hashbrown::HashMap;
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

use crate::model::{EdgeKey, LineRecord, NetworkGraph, NetworkNode, NodeId, Tags};
use crate::prep::infr_length;

/// Nodes that occur exactly once among all edge endpoints.
///
/// Edge direction is ignored, so a two-way pair of edges between the same
/// nodes leaves neither end dangling.
pub fn dangling_nodes<E>(network: &NetworkGraph<E>) -> Vec<&NetworkNode> {
    let mut occurrences: HashMap<NodeId, usize> = HashMap::new();
    for edge in network.edges() {
        *occurrences.entry(edge.key.u).or_insert(0) += 1;
        *occurrences.entry(edge.key.v).or_insert(0) += 1;
    }

    network
        .nodes()
        .filter(|node| occurrences.get(&node.id) == Some(&1))
        .collect()
}

/// Edge of a component with its lengths
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentEdge<E> {
    pub key: EdgeKey,
    pub record: E,
    pub tags: Tags,
    pub geom_length: f64,
    pub infr_length: f64,
}

/// Maximal connected part of a network, ignoring edge direction
#[derive(Debug, Clone, PartialEq)]
pub struct Component<E> {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<ComponentEdge<E>>,
    /// Sum of the edges' infrastructure length
    pub infr_length: f64,
}

/// Splits a network into connected components, largest total
/// infrastructure length first.
///
/// Edge lengths are recomputed from geometry and tags with the same rule as
/// [`infr_length`].
pub fn get_subgraphs<E: LineRecord + Clone>(network: &NetworkGraph<E>) -> Vec<Component<E>> {
    let graph = &network.graph;
    let mut sets = UnionFind::<usize>::new(graph.node_count());
    for edge in graph.edge_references() {
        sets.union(edge.source().index(), edge.target().index());
    }

    // components in order of their first node
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<Component<E>> = Vec::new();
    for idx in graph.node_indices() {
        let root = sets.find(idx.index());
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push(Component {
                nodes: Vec::new(),
                edges: Vec::new(),
                infr_length: 0.0,
            });
            components.len() - 1
        });
        components[slot].nodes.push(graph[idx].id);
    }

    for edge in graph.edge_references() {
        let slot = slots[&sets.find(edge.source().index())];
        let weight = edge.weight();
        let tags = weight.record.tags();
        let geom_length = Euclidean.length(weight.record.geometry());
        let length = infr_length(geom_length, &tags);

        let component = &mut components[slot];
        component.infr_length += length;
        component.edges.push(ComponentEdge {
            key: weight.key,
            record: weight.record.clone(),
            tags,
            geom_length,
            infr_length: length,
        });
    }

    components.sort_by(|a, b| b.infr_length.total_cmp(&a.infr_length));
    log::debug!("Network splits into {} components", components.len());
    components
}
