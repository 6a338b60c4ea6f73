//! Topology and comparison statistics over reconciled networks

pub mod adjacency;
pub mod grid;
pub mod presence;
pub mod stats;
pub mod topology;

pub use adjacency::{AdjacentEdges, find_adjacent_components};
pub use grid::{
    CellDiff, CellLength, GridCell, GridEdge, create_grid, fill_empty, grid_density,
    grid_length_diff, overlay_grid,
};
pub use presence::{AttributePresence, PresenceOutcome, attribute_presence};
pub use stats::{DistanceStatistics, class_length_km, distance_statistics, match_proportion};
pub use topology::{Component, ComponentEdge, dangling_nodes, get_subgraphs};

use crate::model::features::Measured;

/// Length column an aggregation sums
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthColumn {
    /// `geom_length`
    Geom,
    /// `infr_length`
    Infr,
}

impl LengthColumn {
    pub fn of<M: Measured>(&self, row: &M) -> f64 {
        match self {
            LengthColumn::Geom => row.geom_length(),
            LengthColumn::Infr => row.infr_length(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LengthColumn::Geom => "geom_length",
            LengthColumn::Infr => "infr_length",
        }
    }
}

/// Rounds half to even at `decimals` places, the way numeric tables round
pub(crate) fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
