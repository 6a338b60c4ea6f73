//! Preparation of raw line tables: geometry normalization and
//! infrastructure length

pub mod length;
pub mod normalize;

pub use length::{DOUBLE_FACILITY_VALUES, apply_infr_length, infr_length};
pub use normalize::{NormalizeReport, to_linestrings};
