//! OSM exports and per-class loading

mod processor;
mod source;

pub use processor::{ClassLoad, InfraClassQuery, load_infrastructure_classes};
pub(crate) use source::read_feature_collection;
pub use source::{GeoJsonDirSource, OsmSource, load_line_file, raw_feature_from_geojson};
