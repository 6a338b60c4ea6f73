use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use geojson::{Feature, FeatureCollection, GeoJson};
use log::debug;
use serde_json::Value as JsonValue;

use super::InfraClassQuery;
use crate::Error;
use crate::model::{Crs, InfrClass, LineFeature, RawFeature, Table, Tags};
use crate::prep::{apply_infr_length, to_linestrings};

/// Converter from the OSM exchange format to a feature table.
///
/// Implementations return an empty table when there is no data for a
/// query and an error only for structural failures.
pub trait OsmSource {
    fn convert(&self, query: &InfraClassQuery) -> Result<Table<RawFeature>, Error>;
}

/// Reads already converted exports named `export_<name>.geojson` from a
/// directory. Features are taken to be in `crs`.
#[derive(Debug, Clone)]
pub struct GeoJsonDirSource {
    pub dir: PathBuf,
    pub crs: Crs,
}

impl GeoJsonDirSource {
    pub fn new(dir: impl Into<PathBuf>, crs: Crs) -> Self {
        Self {
            dir: dir.into(),
            crs,
        }
    }

    pub fn export_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("export_{name}.geojson"))
    }
}

impl OsmSource for GeoJsonDirSource {
    fn convert(&self, query: &InfraClassQuery) -> Result<Table<RawFeature>, Error> {
        let path = self.export_path(&query.name);
        let mut rows = Vec::new();
        let mut nodes = 0usize;
        for feature in read_feature_collection(&path)?.features {
            match raw_feature_from_geojson(feature)? {
                Some(row) => rows.push(row),
                None => nodes += 1,
            }
        }
        debug!(
            "{}: {} feature(s) read, {nodes} node feature(s) dropped",
            path.display(),
            rows.len()
        );
        Ok(Table::new(self.crs, rows))
    }
}

pub(crate) fn read_feature_collection(path: &Path) -> Result<FeatureCollection, Error> {
    let text = fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    match text
        .parse::<GeoJson>()
        .map_err(|e| Error::GeoJsonError(format!("{}: {e}", path.display())))?
    {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            features: vec![feature],
            bbox: None,
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(Error::GeoJsonError(format!(
            "{}: expected features, found a bare geometry",
            path.display()
        ))),
    }
}

const METADATA_KEYS: [&str; 4] = ["type", "id", "version", "timestamp"];

fn json_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Converts an osm2geojson style feature (`type`, `id`, `tags`, optional
/// `version` and `timestamp` properties). Node features and features
/// without geometry yield `None`.
///
/// # Errors
///
/// Fails on geometry that cannot be represented.
pub fn raw_feature_from_geojson(feature: Feature) -> Result<Option<RawFeature>, Error> {
    let properties = feature.properties.unwrap_or_default();
    if properties.get("type").and_then(JsonValue::as_str) == Some("node") {
        return Ok(None);
    }
    let Some(geometry) = feature.geometry else {
        return Ok(None);
    };
    let geometry = geo::Geometry::<f64>::try_from(geometry.value)
        .map_err(|e| Error::GeoJsonError(e.to_string()))?;

    // flat properties (e.g. matcher output) are taken as tags as a whole
    let tags: Tags = match properties.get("tags").and_then(JsonValue::as_object) {
        Some(tags) => tags
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), json_to_string(value)))
            .collect(),
        None => properties
            .iter()
            .filter(|(key, value)| !value.is_null() && !METADATA_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), json_to_string(value)))
            .collect(),
    };

    let version = properties
        .get("version")
        .and_then(JsonValue::as_u64)
        .and_then(|v| u32::try_from(v).ok());
    let timestamp = properties
        .get("timestamp")
        .and_then(JsonValue::as_str)
        .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
        .map(|t| t.with_timezone(&Utc));

    Ok(Some(RawFeature {
        geometry,
        tags,
        version,
        timestamp,
    }))
}

/// Reads a GeoJSON file of lines, such as the matched and unmatched edges
/// written by a conflation tool.
///
/// Rows are normalized to simple lines and their lengths computed. An
/// `infr_class` property holding a class name sets the row's class.
pub fn load_line_file(path: &Path, crs: Crs) -> Result<Table<LineFeature>, Error> {
    let rows = read_feature_collection(path)?
        .features
        .into_iter()
        .filter_map(|feature| raw_feature_from_geojson(feature).transpose())
        .collect::<Result<Vec<_>, _>>()?;
    let (lines, report) = to_linestrings(Table::new(crs, rows));
    debug!("{}: {} line(s), {} dropped", path.display(), lines.len(), report.dropped);

    Ok(apply_infr_length(lines).map(|mut row| {
        row.infr_class = row
            .tags
            .get("infr_class")
            .and_then(|name| name.parse::<InfrClass>().ok());
        row
    }))
}
