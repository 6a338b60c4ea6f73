use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoJsonValue};
use serde_json::{Value as JsonValue, json};

use crate::Error;
use crate::analysis::{AdjacentEdges, CellDiff, CellLength, Component};
use crate::model::features::Measured;
use crate::model::{LineRecord, NetworkGraph, NetworkNode, Table, Tags};

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}

fn feature(value: JsonValue) -> Result<Feature, Error> {
    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn tag_properties(tags: Tags) -> JsonObject {
    tags.into_iter()
        .map(|(key, value)| (key, JsonValue::String(value)))
        .collect()
}

/// Properties of a measured line: its tags next to the stable columns
/// `infr_class`, `geom_length` and `infr_length`
fn line_properties<R: LineRecord + Measured>(row: &R) -> JsonObject {
    let mut properties = tag_properties(row.tags());
    properties.insert("infr_class".to_string(), json!(row.infr_class()));
    properties.insert("geom_length".to_string(), json!(row.geom_length()));
    properties.insert("infr_length".to_string(), json!(row.infr_length()));
    properties
}

/// Converts a table of lines (OSM features, GIP links or the edge-node
/// model) to a feature collection
pub fn lines_to_geojson<R: LineRecord + Measured>(
    table: &Table<R>,
) -> Result<FeatureCollection, Error> {
    let features = table
        .iter()
        .map(|row| {
            feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(row.geometry())),
                "properties": line_properties(row),
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Edges of a graph with their `u`, `v` and `key` identity
pub fn network_edges_to_geojson<E: LineRecord + Measured>(
    network: &NetworkGraph<E>,
) -> Result<FeatureCollection, Error> {
    let features = network
        .edges()
        .map(|edge| {
            let mut properties = line_properties(&edge.record);
            properties.insert("u".to_string(), json!(edge.key.u));
            properties.insert("v".to_string(), json!(edge.key.v));
            properties.insert("key".to_string(), json!(edge.key.key));
            feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(edge.record.geometry())),
                "properties": properties,
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Nodes, e.g. the dangling nodes of a network
pub fn nodes_to_geojson(nodes: &[&NetworkNode]) -> Result<FeatureCollection, Error> {
    let features = nodes
        .iter()
        .map(|node| {
            feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(&node.geometry)),
                "properties": { "osmid": node.id },
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Edges of all components; `component` is the rank by summed
/// infrastructure length, starting at 0
pub fn components_to_geojson<E: LineRecord>(
    components: &[Component<E>],
) -> Result<FeatureCollection, Error> {
    let mut features = Vec::new();
    for (rank, component) in components.iter().enumerate() {
        for edge in &component.edges {
            let mut properties = tag_properties(edge.tags.clone());
            properties.insert("component".to_string(), json!(rank));
            properties.insert("component_length".to_string(), json!(component.infr_length));
            properties.insert("u".to_string(), json!(edge.key.u));
            properties.insert("v".to_string(), json!(edge.key.v));
            properties.insert("key".to_string(), json!(edge.key.key));
            properties.insert("geom_length".to_string(), json!(edge.geom_length));
            properties.insert("infr_length".to_string(), json!(edge.infr_length));
            features.push(feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(edge.record.geometry())),
                "properties": properties,
            }))?);
        }
    }
    Ok(collection(features))
}

/// Overlap points between nearby components, one per pair of edges
pub fn adjacency_to_geojson(
    adjacent: &BTreeMap<usize, AdjacentEdges>,
) -> Result<FeatureCollection, Error> {
    let features = adjacent
        .iter()
        .map(|(id, pair)| {
            feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(&pair.geometry)),
                "properties": {
                    "id": id,
                    "left": pair.left,
                    "right": pair.right,
                },
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Summed lengths per grid cell
pub fn cell_lengths_to_geojson(cells: &Table<CellLength>) -> Result<FeatureCollection, Error> {
    let features = cells
        .iter()
        .map(|cell| {
            feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(&cell.geometry)),
                "properties": {
                    "grid_id": cell.grid_id,
                    "length": cell.length,
                },
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

/// Per cell length difference between both sources
pub fn cell_diffs_to_geojson(cells: &Table<CellDiff>) -> Result<FeatureCollection, Error> {
    let features = cells
        .iter()
        .map(|cell| {
            feature(json!({
                "type": "Feature",
                "geometry": Geometry::new(GeoJsonValue::from(&cell.geometry)),
                "properties": {
                    "grid_id": cell.grid_id,
                    "length_gip": cell.length_gip,
                    "length_osm": cell.length_osm,
                    "diff_absolute": cell.diff_absolute,
                },
            }))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(collection(features))
}

pub fn to_geojson_string(collection: &FeatureCollection) -> Result<String, Error> {
    serde_json::to_string(collection).map_err(|e| Error::GeoJsonError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use geo::{line_string, polygon};

    use crate::model::{Crs, InfrClass, LineFeature};

    use super::*;

    #[test]
    fn line_properties_carry_stable_columns() {
        let mut tags = Tags::new();
        tags.insert("highway".to_string(), "cycleway".to_string());
        let mut row = LineFeature::new(
            line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)],
            tags,
            None,
            None,
        );
        row.infr_class = Some(InfrClass::CycleTracks);
        let table = Table::new(Crs::AUSTRIA_LAMBERT, vec![row]);

        let collection = lines_to_geojson(&table).unwrap();

        assert_eq!(collection.features.len(), 1);
        let feature = &collection.features[0];
        assert_eq!(feature.property("highway"), Some(&json!("cycleway")));
        assert_eq!(feature.property("infr_class"), Some(&json!("Cycle Tracks")));
        assert_eq!(feature.property("geom_length"), Some(&json!(5.0)));
        assert_eq!(feature.property("infr_length"), Some(&json!(5.0)));
    }

    #[test]
    fn cell_diffs_are_written() {
        let cells = Table::new(
            Crs::AUSTRIA_LAMBERT,
            vec![CellDiff {
                grid_id: 4,
                geometry: polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)],
                length_gip: 2.0,
                length_osm: 3.5,
                diff_absolute: 1.5,
            }],
        );

        let text = to_geojson_string(&cell_diffs_to_geojson(&cells).unwrap()).unwrap();

        assert!(text.contains("\"FeatureCollection\""));
        assert!(text.contains("\"grid_id\":4"));
        assert!(text.contains("\"diff_absolute\":1.5"));
    }
}
