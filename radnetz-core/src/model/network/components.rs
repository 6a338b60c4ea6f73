//! Network components - nodes, edges and their identities

use std::fmt;

use geo::{Coord, Point};
use serde::{Deserialize, Serialize};

use crate::COORD_PRECISION;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

fn fnv1a(chunks: &[i64]) -> u64 {
    let mut hash = FNV_OFFSET;
    for chunk in chunks {
        for byte in chunk.to_le_bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash
}

#[allow(clippy::cast_possible_truncation)]
fn round_coordinate(value: f64) -> i64 {
    (value * 10f64.powi(COORD_PRECISION)).round() as i64
}

/// Node identity derived from an endpoint coordinate.
///
/// Coordinates are rounded to [`COORD_PRECISION`] decimals and hashed with
/// FNV-1a, so equal coordinates always give equal ids. Endpoints that differ
/// beyond that precision become distinct nodes; nothing is snapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl NodeId {
    pub fn from_coord(coord: Coord<f64>) -> Self {
        NodeId(fnv1a(&[round_coordinate(coord.x), round_coordinate(coord.y)]))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Graph node
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkNode {
    pub id: NodeId,
    pub geometry: Point<f64>,
}

/// Identity of a directed edge: origin, destination and a key separating
/// parallel edges between the same pair of nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub u: NodeId,
    pub v: NodeId,
    pub key: u64,
}

impl EdgeKey {
    /// `parallel` is the number of edges already present between `u` and `v`
    #[allow(clippy::cast_possible_wrap)]
    pub fn new(u: NodeId, v: NodeId, parallel: usize) -> Self {
        Self {
            u,
            v,
            key: fnv1a(&[u.0 as i64, parallel as i64]),
        }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.u, self.v, self.key)
    }
}

/// Graph edge carrying the source row
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkEdge<E> {
    pub key: EdgeKey,
    pub record: E,
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;

    #[test]
    fn equal_coordinates_share_identity() {
        let a = NodeId::from_coord(coord! { x: 16.372_1, y: 48.208_4 });
        let b = NodeId::from_coord(coord! { x: 16.372_1, y: 48.208_4 });
        assert_eq!(a, b);
    }

    #[test]
    fn rounding_merges_sub_precision_noise() {
        let a = NodeId::from_coord(coord! { x: 1.0, y: 2.0 });
        let b = NodeId::from_coord(coord! { x: 1.000_000_000_01, y: 2.0 });
        let c = NodeId::from_coord(coord! { x: 1.000_001, y: 2.0 });
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn swapped_axes_differ() {
        let a = NodeId::from_coord(coord! { x: 1.0, y: 2.0 });
        let b = NodeId::from_coord(coord! { x: 2.0, y: 1.0 });
        assert_ne!(a, b);
    }

    #[test]
    fn parallel_edges_get_distinct_keys() {
        let u = NodeId(1);
        let v = NodeId(2);
        assert_ne!(EdgeKey::new(u, v, 0).key, EdgeKey::new(u, v, 1).key);
        assert_eq!(EdgeKey::new(u, v, 0), EdgeKey::new(u, v, 0));
    }
}
