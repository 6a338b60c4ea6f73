//! Reconciliation of crowd-sourced (OSM) and authoritative (GIP) cycling
//! networks into one edge-node model, with the topology and grid
//! statistics used to compare both sources.

pub mod analysis;
pub mod conflation;
pub mod error;
pub mod export;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod prep;
pub mod reconcile;

pub use error::Error;

/// Identifier of a GIP record (links, nodes and turn uses share the id space)
pub type GipId = i64;

/// Decimal places kept when deriving a node identity from a coordinate
pub const COORD_PRECISION: i32 = 7;
