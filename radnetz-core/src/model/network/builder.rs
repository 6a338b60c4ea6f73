//! Graph construction from an arbitrary table of simple lines

use log::{debug, warn};

use super::{EdgeKey, NetworkEdge, NetworkGraph, NetworkNode, NodeId};
use crate::model::{LineRecord, Table};

impl<E: LineRecord> NetworkGraph<E> {
    /// Builds a directed multigraph with one edge per line, from the node
    /// at its first coordinate to the node at its last coordinate.
    ///
    /// Lines without coordinates cannot be placed and are skipped.
    pub fn from_lines(table: Table<E>) -> Self {
        let mut network = NetworkGraph::new(table.crs);
        let mut skipped = 0usize;

        for record in table {
            let geometry = record.geometry();
            let (Some(&first), Some(&last)) = (geometry.0.first(), geometry.0.last()) else {
                skipped += 1;
                continue;
            };

            let u = NodeId::from_coord(first);
            let v = NodeId::from_coord(last);
            let from = network.ensure_node(NetworkNode {
                id: u,
                geometry: first.into(),
            });
            let to = network.ensure_node(NetworkNode {
                id: v,
                geometry: last.into(),
            });

            let key = EdgeKey::new(u, v, network.parallel_edges(from, to));
            network.graph.add_edge(from, to, NetworkEdge { key, record });
        }

        if skipped > 0 {
            warn!("{skipped} line(s) without coordinates skipped while building the graph");
        }
        debug!(
            "Built graph with {} nodes and {} edges",
            network.node_count(),
            network.edge_count()
        );

        network
    }
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use crate::model::{Crs, LineFeature, Table, Tags};

    use super::*;

    fn line(coords: geo::LineString<f64>) -> LineFeature {
        LineFeature::new(coords, Tags::new(), None, None)
    }

    #[test]
    fn shared_endpoints_become_one_node() {
        let table = Table::new(
            Crs::AUSTRIA_LAMBERT,
            vec![
                line(line_string![(x: 0.0, y: 0.0), (x: 5.0, y: 0.0), (x: 10.0, y: 0.0)]),
                line(line_string![(x: 10.0, y: 0.0), (x: 10.0, y: 10.0)]),
            ],
        );

        let graph = NetworkGraph::from_lines(table);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.crs, Crs::AUSTRIA_LAMBERT);
        // interior vertices never become nodes
        assert!(
            graph
                .node(NodeId::from_coord(geo::coord! { x: 5.0, y: 0.0 }))
                .is_none()
        );
    }

    #[test]
    fn parallel_edges_are_kept_with_distinct_keys() {
        let table = Table::new(
            Crs::WGS84,
            vec![
                line(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
                line(line_string![(x: 0.0, y: 0.0), (x: 0.5, y: 0.8), (x: 1.0, y: 1.0)]),
                line(line_string![(x: 1.0, y: 1.0), (x: 0.0, y: 0.0)]),
            ],
        );

        let graph = NetworkGraph::from_lines(table);
        let keys: Vec<_> = graph.edges().map(|e| e.key).collect();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[0].u, keys[1].u);
        assert_eq!(keys[0].v, keys[1].v);
        assert_ne!(keys[0].key, keys[1].key);
        assert_eq!(keys[2].u, keys[0].v);
    }

    #[test]
    fn identity_depends_on_coordinates_only() {
        let a = NetworkGraph::from_lines(Table::new(
            Crs::WGS84,
            vec![line(line_string![(x: 3.0, y: 4.0), (x: 5.0, y: 6.0)])],
        ));
        let b = NetworkGraph::from_lines(Table::new(
            Crs::WGS84,
            vec![
                line(line_string![(x: 9.0, y: 9.0), (x: 8.0, y: 8.0)]),
                line(line_string![(x: 3.0, y: 4.0), (x: 5.0, y: 6.0)]),
            ],
        ));

        let id = NodeId::from_coord(geo::coord! { x: 3.0, y: 4.0 });
        assert!(a.node(id).is_some());
        assert!(b.node(id).is_some());
    }
}
