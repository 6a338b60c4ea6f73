use std::path::Path;

use geo::{BooleanOps, Geometry, MultiPolygon, Polygon};
use log::{info, warn};

use crate::Error;
use crate::model::{Crs, Table};

use super::osm::read_feature_collection;

/// Reads the polygons of a study area GeoJSON file.
///
/// Multi polygons are split into their parts; other geometry types are
/// skipped. Coordinates are taken to be in `crs` already.
pub fn load_study_area(path: &Path, crs: Crs) -> Result<Table<Polygon<f64>>, Error> {
    let mut polygons = Vec::new();
    let mut skipped = 0usize;
    for feature in read_feature_collection(path)?.features {
        let Some(geometry) = feature.geometry else {
            skipped += 1;
            continue;
        };
        match Geometry::<f64>::try_from(geometry.value)
            .map_err(|e| Error::GeoJsonError(e.to_string()))?
        {
            Geometry::Polygon(polygon) => polygons.push(polygon),
            Geometry::MultiPolygon(parts) => polygons.extend(parts),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!("{skipped} feature(s) of the study area are no polygons and were skipped");
    }
    info!("Study area loaded with {} polygon(s)", polygons.len());
    Ok(Table::new(crs, polygons))
}

/// Union of all polygons of a study area
pub fn dissolve(area: &Table<Polygon<f64>>) -> MultiPolygon<f64> {
    area.iter().fold(MultiPolygon::new(Vec::new()), |acc, polygon| {
        acc.union(&MultiPolygon::new(vec![polygon.clone()]))
    })
}
