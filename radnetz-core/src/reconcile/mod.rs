//! Reconciliation of the GIP link dataset with turn-use connectors

pub mod classify;
pub mod turnuse;

pub use classify::{
    CALM_TRAFFIC_WAY_CODES, CYCLE_LANE_CODES, CYCLE_TRACK_CODES, Classification, ConflictReport,
    classify, classify_link, classify_links,
};
pub use turnuse::{
    BusiestNode, EdgeNodeModel, build_edge_node_model, clean_turnuse, connector_degrees,
};
