use geo::{BooleanOps, Buffer, MultiLineString, MultiPolygon, Polygon};
use log::{info, warn};
use serde::Deserialize;

use super::OsmSource;
use crate::Error;
use crate::loading::dissolve;
use crate::model::{Crs, InfrClass, LineFeature, Table};
use crate::prep::{apply_infr_length, to_linestrings};

/// Tolerance added around the study area before clipping OSM data
pub const CLIP_BUFFER: f64 = 1.5;

/// One infrastructure class to load from OSM
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InfraClassQuery {
    /// Class the loaded lines belong to
    pub class: InfrClass,
    /// Short name used for the export file, e.g. `cycle_tracks`
    pub name: String,
    /// Overpass style filter that produced the export; no query means the
    /// class is not analyzed
    #[serde(default)]
    pub query: Option<String>,
}

/// Outcome of loading one infrastructure class
#[derive(Debug)]
pub enum ClassLoad {
    Loaded(Table<LineFeature>),
    /// Legitimately no infrastructure, with the reason
    Empty(String),
    Failed(Error),
}

impl ClassLoad {
    /// Loaded lines, or the canonical empty table for `Empty` and `Failed`
    pub fn into_table(self, crs: Crs) -> Table<LineFeature> {
        match self {
            ClassLoad::Loaded(table) => table,
            ClassLoad::Empty(_) | ClassLoad::Failed(_) => Table::empty(crs),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ClassLoad::Loaded(_))
    }
}

fn clip_lines(table: Table<LineFeature>, area: &MultiPolygon<f64>) -> Table<LineFeature> {
    let crs = table.crs;
    let mut rows = Vec::with_capacity(table.len());
    for row in table {
        let clipped = area.clip(&MultiLineString::new(vec![row.geometry.clone()]), false);
        for part in clipped {
            if part.0.len() < 2 {
                continue;
            }
            let mut piece = LineFeature::new(part, row.tags.clone(), row.version, row.timestamp);
            piece.infr_class = row.infr_class;
            rows.push(piece);
        }
    }
    Table::new(crs, rows)
}

fn load_class(
    source: &impl OsmSource,
    query: &InfraClassQuery,
    clip_area: Option<&MultiPolygon<f64>>,
) -> Result<ClassLoad, Error> {
    if query.query.as_deref().is_none_or(str::is_empty) {
        info!("{}: no own infrastructure class chosen", query.class);
        return Ok(ClassLoad::Empty("no own infrastructure class chosen".to_string()));
    }

    let raw = source.convert(query)?;
    let (mut lines, report) = to_linestrings(raw);
    info!(
        "{}: {} line(s), {} exploded, {} converted from polygons, {} dropped",
        query.class,
        lines.len(),
        report.exploded,
        report.converted,
        report.dropped
    );

    if let Some(area) = clip_area {
        lines = clip_lines(lines, area);
    }
    let lines = apply_infr_length(lines).map(|mut row| {
        row.infr_class = Some(query.class);
        row
    });

    if lines.is_empty() {
        warn!("No {} infrastructure in the study area", query.class);
        return Ok(ClassLoad::Empty(format!(
            "no {} infrastructure in the study area",
            query.class
        )));
    }
    Ok(ClassLoad::Loaded(lines))
}

/// Loads every configured class from `source`.
///
/// With an `area`, lines are clipped to the area grown by [`CLIP_BUFFER`].
/// A failing class is reported as [`ClassLoad::Failed`] and the remaining
/// classes are still loaded.
pub fn load_infrastructure_classes(
    source: &impl OsmSource,
    classes: &[InfraClassQuery],
    area: Option<&Table<Polygon<f64>>>,
) -> Vec<(InfrClass, ClassLoad)> {
    let clip_area = area.map(|area| dissolve(area).buffer(CLIP_BUFFER));

    classes
        .iter()
        .map(|query| {
            let load = load_class(source, query, clip_area.as_ref()).unwrap_or_else(|e| {
                warn!("{}: loading failed: {e}", query.class);
                ClassLoad::Failed(e)
            });
            (query.class, load)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, MultiLineString, Point, line_string, polygon};

    use crate::model::{RawFeature, Tags};

    use super::*;

    struct FixedSource;

    impl OsmSource for FixedSource {
        fn convert(&self, query: &InfraClassQuery) -> Result<Table<RawFeature>, Error> {
            let mut both = Tags::new();
            both.insert("cycleway:both".to_string(), "lane".to_string());
            match query.name.as_str() {
                "lanes" => Ok(Table::new(
                    Crs::AUSTRIA_LAMBERT,
                    vec![
                        RawFeature::new(
                            line_string![(x: -50.0, y: 50.0), (x: 150.0, y: 50.0)],
                            both,
                        ),
                        RawFeature::new(
                            Geometry::MultiLineString(MultiLineString::new(vec![
                                line_string![(x: 10.0, y: 10.0), (x: 10.0, y: 20.0)],
                                line_string![(x: 500.0, y: 0.0), (x: 600.0, y: 0.0)],
                            ])),
                            Tags::new(),
                        ),
                    ],
                )),
                "tracks" => Ok(Table::new(
                    Crs::AUSTRIA_LAMBERT,
                    vec![RawFeature::new(Point::new(5.0, 5.0), Tags::new())],
                )),
                _ => Err(Error::InvalidData("broken export".to_string())),
            }
        }
    }

    fn query(class: InfrClass, name: &str, query: Option<&str>) -> InfraClassQuery {
        InfraClassQuery {
            class,
            name: name.to_string(),
            query: query.map(str::to_string),
        }
    }

    #[test]
    fn classes_are_loaded_independently() {
        let area = Table::new(
            Crs::AUSTRIA_LAMBERT,
            vec![polygon![
                (x: 0.0, y: 0.0),
                (x: 100.0, y: 0.0),
                (x: 100.0, y: 100.0),
                (x: 0.0, y: 100.0),
            ]],
        );
        let classes = [
            query(InfrClass::CycleLanes, "lanes", Some("[cycleway=lane]")),
            query(InfrClass::CycleTracks, "tracks", Some("[highway=cycleway]")),
            query(InfrClass::CalmTrafficWays, "calm", Some("[highway=living_street]")),
            query(InfrClass::CycleTracks, "unused", None),
        ];

        let loads = load_infrastructure_classes(&FixedSource, &classes, Some(&area));

        let ClassLoad::Loaded(lanes) = &loads[0].1 else {
            panic!("lanes should load");
        };
        // the distant part lies outside the buffered area
        assert_eq!(lanes.len(), 2);
        let clipped = &lanes.rows[0];
        assert!((clipped.geom_length - 103.0).abs() < 1e-3);
        assert!((clipped.infr_length - 206.0).abs() < 1e-3);
        assert!(lanes.iter().all(|row| row.infr_class == Some(InfrClass::CycleLanes)));

        assert!(matches!(loads[1].1, ClassLoad::Empty(_)));
        assert!(matches!(loads[2].1, ClassLoad::Failed(Error::InvalidData(_))));
        assert!(matches!(&loads[3].1, ClassLoad::Empty(reason) if reason.contains("no own")));
    }

    #[test]
    fn unclipped_lines_keep_their_extent() {
        let classes = [query(InfrClass::CycleLanes, "lanes", Some("[cycleway=lane]"))];

        let loads = load_infrastructure_classes(&FixedSource, &classes, None);
        let table = loads
            .into_iter()
            .next()
            .map(|(_, load)| load.into_table(Crs::AUSTRIA_LAMBERT))
            .unwrap();

        assert_eq!(table.len(), 3);
        assert!((table.rows[0].geom_length - 200.0).abs() < 1e-9);
    }
}
