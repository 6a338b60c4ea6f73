//! Edge-node model from GIP links and turn-use connectors.
//!
//! Turn uses describe traversals "from link A via node N to link B". Each
//! usable turn use becomes one or two connector edges: nodes touched by at
//! most two turn uses are bridged directly, busier nodes become hubs that
//! every connector runs into.

use std::collections::BTreeMap;

use geo::{Coord, LineString, Point};
use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};

use crate::model::{ConnectorEdge, Crs, GipLink, GipNode, ModelEdge, Table, TurnUse};
use crate::{Error, GipId};

/// Keeps turn uses whose both ends reference links of `links`
pub fn clean_turnuse(turnuses: Table<TurnUse>, links: &Table<GipLink>) -> Table<TurnUse> {
    let link_ids: HashSet<GipId> = links.iter().map(|link| link.id).collect();
    let before = turnuses.len();
    let cleaned = turnuses.retain(|turnuse| {
        link_ids.contains(&turnuse.use_from_id) && link_ids.contains(&turnuse.use_to_id)
    });
    debug!(
        "Kept {} of {before} turn uses connecting two cycling links",
        cleaned.len()
    );
    cleaned
}

/// Number of turn uses passing through each via node
pub fn connector_degrees(turnuses: &[TurnUse]) -> BTreeMap<GipId, usize> {
    let mut degrees = BTreeMap::new();
    for turnuse in turnuses {
        *degrees.entry(turnuse.via_node_id).or_insert(0) += 1;
    }
    degrees
}

/// Via node with the most turn uses
#[derive(Debug, Clone, PartialEq)]
pub struct BusiestNode {
    pub node_id: GipId,
    pub degree: usize,
    /// Position in the model's reference
    pub position: Point<f64>,
    pub crs: Crs,
}

impl BusiestNode {
    /// Position as longitude/latitude, for reporting
    ///
    /// # Errors
    ///
    /// Fails if the model's reference has no built-in inverse projection.
    pub fn lon_lat(&self) -> Result<Point<f64>, Error> {
        self.crs.to_lon_lat(self.position)
    }
}

/// Reconciled edge-node model
#[derive(Debug, Clone)]
pub struct EdgeNodeModel {
    /// Links followed by the deduplicated connector edges
    pub edges: Table<ModelEdge>,
    /// Connector degree per via node
    pub degrees: BTreeMap<GipId, usize>,
    /// Turn uses skipped because their via node is unknown
    pub unresolved: usize,
    /// Connector edges added to the links
    pub connectors: usize,
    busiest: Option<BusiestNode>,
}

impl EdgeNodeModel {
    /// The via node with the highest connector degree; ties go to the
    /// lowest node id
    pub fn busiest_node(&self) -> Option<&BusiestNode> {
        self.busiest.as_ref()
    }
}

type GeometryKey = Vec<(u64, u64)>;

fn geometry_key(line: &LineString<f64>) -> GeometryKey {
    line.0.iter().map(|c| (c.x.to_bits(), c.y.to_bits())).collect()
}

fn connector(turnuse: &TurnUse, from: Coord<f64>, to: Coord<f64>) -> ConnectorEdge {
    ConnectorEdge {
        geometry: LineString::new(vec![from, to]),
        via_node_id: turnuse.via_node_id,
        use_to_id: turnuse.use_to_id,
        use_from_id: turnuse.use_from_id,
        turnuse_object_id: turnuse.object_id,
        timestamp: turnuse.timestamp.clone(),
    }
}

fn check_crs(expected: Crs, found: Crs, what: &str) -> Result<(), Error> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::InvalidData(format!(
            "{what} are in {found}, links are in {expected}"
        )))
    }
}

/// Merges classified links with connector edges derived from turn uses.
///
/// For every turn use whose via node exists in `nodes`, with `first` and
/// `last` the ends of its geometry:
/// - via nodes with a connector degree of 1 or 2 get one edge `first -> last`
/// - busier via nodes get two edges, `first -> node` and `last -> node`
///
/// Connector edges with identical geometry are kept once. Turn uses with
/// unknown via nodes are skipped.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] if the tables use different references or
/// a turn use has no geometry.
pub fn build_edge_node_model(
    links: Table<GipLink>,
    turnuses: &Table<TurnUse>,
    nodes: &Table<GipNode>,
) -> Result<EdgeNodeModel, Error> {
    check_crs(links.crs, turnuses.crs, "Turn uses")?;
    check_crs(links.crs, nodes.crs, "Nodes")?;

    let degrees = connector_degrees(&turnuses.rows);
    let positions: HashMap<GipId, Point<f64>> =
        nodes.iter().map(|node| (node.id, node.position)).collect();

    let mut seen: HashSet<GeometryKey> = HashSet::new();
    let mut connectors: Vec<ModelEdge> = Vec::new();
    let mut unresolved = 0usize;
    let mut push = |edge: ConnectorEdge| {
        if seen.insert(geometry_key(&edge.geometry)) {
            connectors.push(ModelEdge::Connector(edge));
        }
    };

    for turnuse in turnuses {
        let Some(node) = positions.get(&turnuse.via_node_id) else {
            unresolved += 1;
            continue;
        };
        let (Some(&first), Some(&last)) = (turnuse.geometry.0.first(), turnuse.geometry.0.last())
        else {
            return Err(Error::InvalidData(format!(
                "Turn use {} has an empty geometry",
                turnuse.object_id
            )));
        };

        match degrees[&turnuse.via_node_id] {
            1 | 2 => push(connector(turnuse, first, last)),
            _ => {
                push(connector(turnuse, first, node.0));
                push(connector(turnuse, last, node.0));
            }
        }
    }

    if unresolved > 0 {
        warn!("{unresolved} turn use(s) skipped: via node not found in node table");
    }

    let busiest = degrees
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .and_then(|(&node_id, &degree)| {
            let position = positions.get(&node_id).copied().or_else(|| {
                turnuses
                    .iter()
                    .find(|t| t.via_node_id == node_id)
                    .and_then(|t| t.geometry.0.first())
                    .map(|&c| c.into())
            })?;
            Some(BusiestNode {
                node_id,
                degree,
                position,
                crs: links.crs,
            })
        });

    let connector_count = connectors.len();
    let crs = links.crs;
    let edges = links.map(ModelEdge::Link).concat(Table::new(crs, connectors))?;

    info!(
        "Edge-node model: {} edges ({connector_count} connectors from {} turn uses)",
        edges.len(),
        turnuses.len()
    );

    Ok(EdgeNodeModel {
        edges,
        degrees,
        unresolved,
        connectors: connector_count,
        busiest,
    })
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point};

    use crate::model::{InfrClass, LineRecord, Tags};

    use super::*;

    const CRS: Crs = Crs::AUSTRIA_LAMBERT;

    fn link(id: GipId, line: LineString<f64>) -> GipLink {
        GipLink {
            id,
            use_id: None,
            geometry: line,
            bike_tow: Some("RW".to_string()),
            bike_bkw: None,
            attributes: Tags::new(),
            infr_class: Some(InfrClass::CycleTracks),
        }
    }

    fn turnuse(
        object_id: GipId,
        via: GipId,
        from: GipId,
        to: GipId,
        line: LineString<f64>,
    ) -> TurnUse {
        TurnUse {
            object_id,
            via_node_id: via,
            use_from_id: from,
            use_to_id: to,
            timestamp: Some("2023-01-01".to_string()),
            geometry: line,
        }
    }

    fn node(id: GipId, x: f64, y: f64) -> GipNode {
        GipNode {
            id,
            position: point!(x: x, y: y),
        }
    }

    fn connectors(model: &EdgeNodeModel) -> Vec<&ConnectorEdge> {
        model
            .edges
            .iter()
            .filter_map(|e| match e {
                ModelEdge::Connector(c) => Some(c),
                ModelEdge::Link(_) => None,
            })
            .collect()
    }

    #[test]
    fn single_turnuse_bridges_directly() {
        let links = Table::new(
            CRS,
            vec![link(1, line_string![(x: -10.0, y: 0.0), (x: -1.0, y: 0.0)])],
        );
        let turnuses = Table::new(
            CRS,
            vec![turnuse(
                100,
                7,
                1,
                2,
                line_string![(x: -1.0, y: 0.0), (x: 0.0, y: 0.2), (x: 0.0, y: 1.0)],
            )],
        );
        let nodes = Table::new(CRS, vec![node(7, 0.0, 0.0)]);

        let model = build_edge_node_model(links, &turnuses, &nodes).unwrap();
        let added = connectors(&model);

        assert_eq!(model.edges.len(), 2);
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].geometry, line_string![(x: -1.0, y: 0.0), (x: 0.0, y: 1.0)]);
        assert_eq!(added[0].turnuse_object_id, 100);
        assert_eq!(model.edges.rows[1].infr_class(), Some(InfrClass::Turnuse));
        assert_eq!(model.edges.rows[1].tags()["VIA_NODE_ID"], "7");
    }

    #[test]
    fn busy_node_becomes_hub_and_duplicates_collapse() {
        // three arms meeting at node 9 in (0, 0)
        let west = (-1.0, 0.0);
        let east = (1.0, 0.0);
        let north = (0.0, 1.0);
        let turnuses = Table::new(
            CRS,
            vec![
                turnuse(1, 9, 10, 11, LineString::from(vec![west, east])),
                turnuse(2, 9, 11, 12, LineString::from(vec![east, north])),
                turnuse(3, 9, 12, 10, LineString::from(vec![north, west])),
            ],
        );
        let nodes = Table::new(CRS, vec![node(9, 0.0, 0.0)]);

        let model = build_edge_node_model(Table::empty(CRS), &turnuses, &nodes).unwrap();

        // 6 candidate edges, one spoke per arm survives
        assert_eq!(model.degrees[&9], 3);
        assert_eq!(model.connectors, 3);
        let mut starts: Vec<_> = connectors(&model)
            .iter()
            .map(|c| (c.geometry.0[0].x, c.geometry.0[0].y))
            .collect();
        starts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(starts, vec![west, north, east]);
        for c in connectors(&model) {
            assert_eq!(c.geometry.0[1], geo::coord! { x: 0.0, y: 0.0 });
        }
    }

    #[test]
    fn node_with_two_turnuses_is_bridged_per_record() {
        let west = (-1.0, 0.0);
        let east = (1.0, 0.0);
        let turnuses = Table::new(
            CRS,
            vec![
                turnuse(1, 9, 10, 11, LineString::from(vec![west, (0.0, 0.3), east])),
                turnuse(2, 9, 11, 10, LineString::from(vec![east, (0.0, -0.3), west])),
            ],
        );
        let nodes = Table::new(CRS, vec![node(9, 0.0, 0.0)]);

        let model = build_edge_node_model(Table::empty(CRS), &turnuses, &nodes).unwrap();
        let added = connectors(&model);

        assert_eq!(model.degrees[&9], 2);
        assert_eq!(added.len(), 2);
        assert_eq!(added[0].geometry, LineString::from(vec![west, east]));
        assert_eq!(added[0].turnuse_object_id, 1);
        assert_eq!(added[1].geometry, LineString::from(vec![east, west]));
        assert_eq!(added[1].turnuse_object_id, 2);
        let hub = geo::coord! { x: 0.0, y: 0.0 };
        assert!(added.iter().all(|c| !c.geometry.0.contains(&hub)));
    }

    #[test]
    fn four_arm_node_becomes_hub() {
        let arms = [(-1.0, 0.0), (0.0, 1.0), (1.0, 0.0), (0.0, -1.0)];
        let turnuses = Table::new(
            CRS,
            (0..4)
                .map(|i| {
                    let line = LineString::from(vec![arms[i], arms[(i + 1) % 4]]);
                    turnuse(i as GipId + 1, 9, 10, 11, line)
                })
                .collect(),
        );
        let nodes = Table::new(CRS, vec![node(9, 0.0, 0.0)]);

        let model = build_edge_node_model(Table::empty(CRS), &turnuses, &nodes).unwrap();
        let added = connectors(&model);

        // 8 spokes, one per arm after deduplication
        assert_eq!(model.degrees[&9], 4);
        assert_eq!(added.len(), 4);
        for c in &added {
            assert_eq!(c.geometry.0.len(), 2);
            assert_eq!(c.geometry.0[1], geo::coord! { x: 0.0, y: 0.0 });
        }
        let mut starts: Vec<_> = added
            .iter()
            .map(|c| (c.geometry.0[0].x, c.geometry.0[0].y))
            .collect();
        starts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(starts, vec![(-1.0, 0.0), (0.0, -1.0), (0.0, 1.0), (1.0, 0.0)]);
    }

    #[test]
    fn unresolved_via_nodes_leave_links_untouched() {
        let links = Table::new(
            CRS,
            vec![link(1, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)])],
        );
        let turnuses = Table::new(
            CRS,
            vec![turnuse(5, 404, 1, 1, line_string![(x: 1.0, y: 0.0), (x: 1.0, y: 1.0)])],
        );

        let model = build_edge_node_model(links.clone(), &turnuses, &Table::empty(CRS)).unwrap();

        assert_eq!(model.unresolved, 1);
        assert_eq!(model.edges, links.map(ModelEdge::Link));
    }

    #[test]
    fn busiest_node_ties_go_to_lowest_id() {
        let line = || line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        let turnuses = Table::new(
            CRS,
            vec![
                turnuse(1, 50, 1, 2, line()),
                turnuse(2, 20, 1, 2, line()),
                turnuse(3, 50, 1, 2, line()),
                turnuse(4, 20, 1, 2, line()),
            ],
        );
        let nodes = Table::new(CRS, vec![node(20, 3.0, 4.0), node(50, 5.0, 6.0)]);

        let model = build_edge_node_model(Table::empty(CRS), &turnuses, &nodes).unwrap();
        let busiest = model.busiest_node().unwrap();

        assert_eq!(busiest.node_id, 20);
        assert_eq!(busiest.degree, 2);
        assert_eq!(busiest.position, point!(x: 3.0, y: 4.0));
    }

    #[test]
    fn mismatched_references_are_rejected() {
        let result = build_edge_node_model(
            Table::empty(CRS),
            &Table::empty(Crs::WGS84),
            &Table::empty(CRS),
        );
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn cleaning_keeps_turnuses_between_known_links() {
        let line = || line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)];
        let links = Table::new(CRS, vec![link(1, line()), link(2, line())]);
        let turnuses = Table::new(
            CRS,
            vec![
                turnuse(1, 9, 1, 2, line()),
                turnuse(2, 9, 1, 3, line()),
                turnuse(3, 9, 4, 2, line()),
            ],
        );

        let cleaned = clean_turnuse(turnuses, &links);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.rows[0].object_id, 1);
    }
}
