//! Detection of components that nearly touch.
//!
//! Edges of different components whose buffers overlap are likely
//! digitization gaps: they should be connected but are not.

use std::collections::BTreeMap;

use geo::{
    BooleanOps, BoundingRect, Buffer, Centroid, Intersects, LineString, MultiPolygon, Point,
};
use hashbrown::HashSet;
use log::{debug, info};
use rayon::prelude::*;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};
use serde::Serialize;

use crate::model::{EdgeKey, LineRecord};

use super::Component;

/// Pair of edges from different components lying within the tolerance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjacentEdges {
    pub left: EdgeKey,
    pub right: EdgeKey,
    /// Centroid of the overlap of both edge buffers
    pub geometry: Point<f64>,
}

type BufferBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn buffer_index(buffers: &[MultiPolygon<f64>]) -> RTree<BufferBox> {
    let boxes = buffers
        .iter()
        .enumerate()
        .filter_map(|(idx, buffer)| {
            let rect = buffer.bounding_rect()?;
            Some(GeomWithData::new(
                Rectangle::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
                idx,
            ))
        })
        .collect();
    RTree::bulk_load(boxes)
}

/// Finds edges of different components within `buffer_dist` of each other.
///
/// Every edge is buffered by half the distance; each unordered pair of
/// overlapping buffers from different components is reported once, keyed by
/// a sequential index, with the centroid of the overlap as its location.
pub fn find_adjacent_components<E: LineRecord>(
    components: &[Component<E>],
    buffer_dist: f64,
) -> BTreeMap<usize, AdjacentEdges> {
    let edges: Vec<(usize, EdgeKey, &LineString<f64>)> = components
        .iter()
        .enumerate()
        .flat_map(|(component, c)| {
            c.edges
                .iter()
                .map(move |e| (component, e.key, e.record.geometry()))
        })
        .collect();

    let buffers: Vec<MultiPolygon<f64>> = edges
        .par_iter()
        .map(|(_, _, line)| line.buffer(buffer_dist / 2.0))
        .collect();
    let index = buffer_index(&buffers);

    let mut seen: HashSet<(EdgeKey, EdgeKey)> = HashSet::new();
    let mut results = BTreeMap::new();

    for (i, (component, key, _)) in edges.iter().enumerate() {
        let Some(rect) = buffers[i].bounding_rect() else {
            continue;
        };
        let envelope =
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);

        let mut candidates: Vec<usize> = index
            .locate_in_envelope_intersecting(&envelope)
            .map(|hit| hit.data)
            .filter(|&j| j > i && edges[j].0 != *component)
            .collect();
        candidates.sort_unstable();

        for j in candidates {
            let other = edges[j].1;
            let pair = if *key <= other { (*key, other) } else { (other, *key) };
            if seen.contains(&pair) || !buffers[i].intersects(&buffers[j]) {
                continue;
            }

            let overlap = buffers[i].intersection(&buffers[j]);
            let Some(centroid) = overlap.centroid() else {
                debug!("Buffers of {key} and {other} only touch, skipping");
                continue;
            };
            seen.insert(pair);
            results.insert(
                results.len(),
                AdjacentEdges {
                    left: *key,
                    right: other,
                    geometry: centroid,
                },
            );
        }
    }

    info!(
        "Found {} edge pairs of different components within {buffer_dist}",
        results.len()
    );
    results
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use crate::analysis::get_subgraphs;
    use crate::model::{Crs, LineFeature, NetworkGraph, Table, Tags};

    use super::*;

    fn network(lines: Vec<LineString<f64>>) -> NetworkGraph<LineFeature> {
        NetworkGraph::from_lines(Table::new(
            Crs::AUSTRIA_LAMBERT,
            lines
                .into_iter()
                .map(|l| LineFeature::new(l, Tags::new(), None, None))
                .collect(),
        ))
    }

    #[test]
    fn gap_between_components_is_found() {
        let components = get_subgraphs(&network(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 11.0, y: 0.0), (x: 20.0, y: 0.0)],
            line_string![(x: 0.0, y: 100.0), (x: 10.0, y: 100.0)],
        ]));
        assert_eq!(components.len(), 3);

        let adjacent = find_adjacent_components(&components, 2.0);

        assert_eq!(adjacent.len(), 1);
        let pair = &adjacent[&0];
        assert_ne!(pair.left, pair.right);
        // overlap lies in the gap between x = 10 and x = 11
        assert!(pair.geometry.x() > 9.5 && pair.geometry.x() < 11.5);
        assert!(pair.geometry.y().abs() < 1e-6);
    }

    #[test]
    fn edges_of_one_component_are_never_paired() {
        let components = get_subgraphs(&network(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 10.0, y: 0.0), (x: 10.0, y: 10.0)],
            line_string![(x: 10.0, y: 10.0), (x: 0.0, y: 0.5)],
        ]));
        assert_eq!(components.len(), 1);

        assert!(find_adjacent_components(&components, 5.0).is_empty());
    }

    #[test]
    fn distant_components_are_not_adjacent() {
        let components = get_subgraphs(&network(vec![
            line_string![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0)],
            line_string![(x: 0.0, y: 50.0), (x: 10.0, y: 50.0)],
        ]));

        assert!(find_adjacent_components(&components, 10.0).is_empty());
    }
}
