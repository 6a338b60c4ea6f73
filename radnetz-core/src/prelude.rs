// Re-export key components
pub use crate::analysis::{
    Component, LengthColumn, attribute_presence, class_length_km, create_grid, dangling_nodes,
    find_adjacent_components, get_subgraphs, grid_density, grid_length_diff, match_proportion,
    overlay_grid,
};
pub use crate::conflation::group_by_edge_id;
pub use crate::loading::{
    ClassLoad, GeoJsonDirSource, LoadConfig, OsmSource, load_gip_dataset,
    load_infrastructure_classes, load_study_area,
};
pub use crate::prep::{apply_infr_length, to_linestrings};
pub use crate::reconcile::{EdgeNodeModel, build_edge_node_model, classify_links};

// Core data model
pub use crate::model::{
    ClassFilter, Crs, InfrClass, LineFeature, LineRecord, Measured, ModelEdge, NetworkGraph,
    Table,
};

pub use crate::{COORD_PRECISION, Error, GipId};
