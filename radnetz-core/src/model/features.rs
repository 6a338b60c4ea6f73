//! Line features and the traits shared by every edge-like row

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use geo::{Euclidean, Geometry, Length, LineString};

use super::InfrClass;

/// OSM-style attribute mapping (key to value)
pub type Tags = BTreeMap<String, String>;

/// A feature as delivered by a source, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawFeature {
    pub geometry: Geometry<f64>,
    pub tags: Tags,
    pub version: Option<u32>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RawFeature {
    pub fn new(geometry: impl Into<Geometry<f64>>, tags: Tags) -> Self {
        Self {
            geometry: geometry.into(),
            tags,
            version: None,
            timestamp: None,
        }
    }
}

/// A simple line with its attributes and derived lengths
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    pub geometry: LineString<f64>,
    pub tags: Tags,
    pub version: Option<u32>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Planar length in the table's reference
    pub geom_length: f64,
    /// Length of cycling infrastructure the line stands for
    pub infr_length: f64,
    /// Class the feature was loaded for, if any
    pub infr_class: Option<InfrClass>,
}

impl LineFeature {
    pub fn new(
        geometry: LineString<f64>,
        tags: Tags,
        version: Option<u32>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Self {
        let geom_length = Euclidean.length(&geometry);
        Self {
            geometry,
            tags,
            version,
            timestamp,
            geom_length,
            infr_length: geom_length,
            infr_class: None,
        }
    }

    /// Number of tags on the feature
    pub fn attribute_amount(&self) -> usize {
        self.tags.len()
    }
}

/// A row that carries a line geometry and can expose its attributes as tags
pub trait LineRecord {
    fn geometry(&self) -> &LineString<f64>;

    /// Attribute set materialized as a queryable mapping
    fn tags(&self) -> Tags;
}

impl LineRecord for LineFeature {
    fn geometry(&self) -> &LineString<f64> {
        &self.geometry
    }

    fn tags(&self) -> Tags {
        self.tags.clone()
    }
}

/// A row with lengths and an infrastructure class, as used by aggregations
pub trait Measured {
    fn geom_length(&self) -> f64;
    fn infr_length(&self) -> f64;
    fn infr_class(&self) -> Option<InfrClass>;
}

impl Measured for LineFeature {
    fn geom_length(&self) -> f64 {
        self.geom_length
    }

    fn infr_length(&self) -> f64 {
        self.infr_length
    }

    fn infr_class(&self) -> Option<InfrClass> {
        self.infr_class
    }
}
