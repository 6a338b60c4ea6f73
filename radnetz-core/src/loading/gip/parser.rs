use std::fs::File;
use std::path::Path;

use geo::{Geometry, LineString, Point};
use wkt::TryFromWkt;

use crate::Error;

/// Reads every row of a CSV file with headers into `T`.
///
/// A malformed row halts loading with an error naming the file.
pub fn deserialize_csv_file<T>(path: &Path) -> Result<Vec<T>, Error>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    csv::Reader::from_reader(file)
        .deserialize()
        .map(|row| {
            row.map_err(|e| Error::CsvError {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

fn parse_geometry(wkt: &str) -> Result<Geometry<f64>, Error> {
    Geometry::try_from_wkt_str(wkt)
        .map_err(|e| Error::WktError(format!("Failed to parse '{wkt}': {e}")))
}

/// Parses a WKT line. Single-part multi lines are accepted as well.
pub fn parse_line(wkt: &str) -> Result<LineString<f64>, Error> {
    match parse_geometry(wkt)? {
        Geometry::LineString(line) => Ok(line),
        Geometry::MultiLineString(mut lines) if lines.0.len() == 1 => Ok(lines.0.remove(0)),
        other => Err(Error::InvalidData(format!(
            "Expected a line geometry, got {other:?}"
        ))),
    }
}

pub fn parse_point(wkt: &str) -> Result<Point<f64>, Error> {
    match parse_geometry(wkt)? {
        Geometry::Point(point) => Ok(point),
        other => Err(Error::InvalidData(format!(
            "Expected a point geometry, got {other:?}"
        ))),
    }
}
