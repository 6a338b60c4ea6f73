//! This module is responsible for loading the two source datasets (GIP CSV
//! exports, OSM GeoJSON exports) and the study area into typed tables.

mod area;
mod config;
pub mod gip;
pub mod osm;

pub use area::{dissolve, load_study_area};
pub use config::{LoadConfig, validate_config};
pub use gip::{GipDataset, deserialize_csv_file, load_gip_dataset};
pub use osm::{
    ClassLoad, GeoJsonDirSource, InfraClassQuery, OsmSource, load_infrastructure_classes,
    load_line_file,
};
