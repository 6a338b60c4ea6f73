//! Data model for network reconciliation
//!
//! Tables carry their coordinate reference system; rows are plain structs
//! owned by whichever pipeline stage is currently working on them.

pub mod crs;
pub mod features;
pub mod gip;
pub mod infra;
pub mod network;
pub mod table;

pub use crs::Crs;
pub use features::{LineFeature, LineRecord, Measured, RawFeature, Tags};
pub use gip::{ConnectorEdge, GipLink, GipNode, ModelEdge, TurnUse};
pub use infra::{ClassFilter, InfrClass};
pub use network::{EdgeKey, NetworkEdge, NetworkGraph, NetworkNode, NodeId};
pub use table::Table;
