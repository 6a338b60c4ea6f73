//! GeoJSON output of loaded tables and analysis results

mod to_geojson;

pub use to_geojson::{
    adjacency_to_geojson, cell_diffs_to_geojson, cell_lengths_to_geojson,
    components_to_geojson, lines_to_geojson, network_edges_to_geojson, nodes_to_geojson,
    to_geojson_string,
};
