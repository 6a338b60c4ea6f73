//! Reduction of heterogeneous geometries to simple lines

use geo::{Geometry, LineString, Polygon};
use log::{debug, warn};

use crate::model::{LineFeature, RawFeature, Table};

/// Counts of what normalization did to a table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Simple lines produced by splitting multi-part geometries
    pub exploded: usize,
    /// Lines produced from polygon boundaries
    pub converted: usize,
    /// Pieces dropped because they are not lines
    pub dropped: usize,
}

enum Piece {
    Line(LineString<f64>),
    Ring(LineString<f64>),
    Other,
}

fn ring(polygon: Polygon<f64>) -> Piece {
    let (exterior, _) = polygon.into_inner();
    Piece::Ring(exterior)
}

/// Splits a geometry into single-part pieces, in order
fn explode(geometry: Geometry<f64>, pieces: &mut Vec<Piece>) {
    match geometry {
        Geometry::LineString(line) => pieces.push(Piece::Line(line)),
        Geometry::Line(line) => pieces.push(Piece::Line(line.into())),
        Geometry::MultiLineString(lines) => {
            pieces.extend(lines.0.into_iter().map(Piece::Line));
        }
        Geometry::Polygon(polygon) => pieces.push(ring(polygon)),
        Geometry::MultiPolygon(polygons) => pieces.extend(polygons.0.into_iter().map(ring)),
        Geometry::Rect(rect) => pieces.push(ring(rect.to_polygon())),
        Geometry::Triangle(triangle) => pieces.push(ring(triangle.to_polygon())),
        Geometry::GeometryCollection(collection) => {
            for inner in collection.0 {
                explode(inner, pieces);
            }
        }
        Geometry::MultiPoint(points) => {
            pieces.extend(points.0.iter().map(|_| Piece::Other));
        }
        Geometry::Point(_) => pieces.push(Piece::Other),
    }
}

/// Converts a table of arbitrary geometries into simple lines.
///
/// Multi-part geometries are split into their parts, each keeping the
/// parent's attributes. Polygons are replaced by their exterior ring.
/// Everything else, including degenerate lines with fewer than two
/// coordinates, is dropped and counted. An empty result is valid.
pub fn to_linestrings(table: Table<RawFeature>) -> (Table<LineFeature>, NormalizeReport) {
    let mut report = NormalizeReport::default();
    let crs = table.crs;
    let mut rows = Vec::with_capacity(table.len());
    let mut pieces = Vec::new();

    for feature in table {
        pieces.clear();
        let is_multi_part = matches!(
            feature.geometry,
            Geometry::MultiLineString(_)
                | Geometry::MultiPolygon(_)
                | Geometry::MultiPoint(_)
                | Geometry::GeometryCollection(_)
        );
        explode(feature.geometry, &mut pieces);

        for piece in pieces.drain(..) {
            let line = match piece {
                Piece::Line(line) => {
                    if is_multi_part {
                        report.exploded += 1;
                    }
                    line
                }
                Piece::Ring(line) => {
                    report.converted += 1;
                    line
                }
                Piece::Other => {
                    report.dropped += 1;
                    continue;
                }
            };
            if line.0.len() < 2 {
                report.dropped += 1;
                continue;
            }
            rows.push(LineFeature::new(
                line,
                feature.tags.clone(),
                feature.version,
                feature.timestamp,
            ));
        }
    }

    if report.dropped > 0 {
        warn!("{} row(s) dropped which are no Linestrings.", report.dropped);
    }
    debug!(
        "Normalized to {} lines ({} from multi-part geometries, {} from polygons)",
        rows.len(),
        report.exploded,
        report.converted
    );

    (Table::new(crs, rows), report)
}
