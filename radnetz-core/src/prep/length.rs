//! Effective infrastructure length of OSM lines.
//!
//! One OSM way tagged with cycleways on both sides stands for two
//! one-directional facilities sharing a single geometry, so its
//! infrastructure length is twice its geometric length.

use crate::model::{LineFeature, Table, Tags};

/// Values marking a separate facility on each side of the way
pub const DOUBLE_FACILITY_VALUES: [&str; 4] = ["lane", "opposite_lane", "track", "opposite_track"];

fn is_double_facility(tags: &Tags, key: &str) -> bool {
    tags.get(key)
        .is_some_and(|value| DOUBLE_FACILITY_VALUES.contains(&value.as_str()))
}

/// Infrastructure length of a line with `geom_length` and `tags`.
///
/// Rules are checked in order `cycleway`, `cycleway:both`, then the
/// `cycleway:left` + `cycleway:right` pair (both sides must qualify);
/// the first rule that holds doubles the length.
pub fn infr_length(geom_length: f64, tags: &Tags) -> f64 {
    let doubled = is_double_facility(tags, "cycleway")
        || is_double_facility(tags, "cycleway:both")
        || (is_double_facility(tags, "cycleway:left")
            && is_double_facility(tags, "cycleway:right"));

    if doubled { geom_length * 2.0 } else { geom_length }
}

/// Recomputes `infr_length` for every row from its tags and `geom_length`
pub fn apply_infr_length(table: Table<LineFeature>) -> Table<LineFeature> {
    table.map(|mut row| {
        row.infr_length = infr_length(row.geom_length, &row.tags);
        row
    })
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use crate::model::Crs;

    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn cycleway_track_doubles() {
        assert_eq!(infr_length(12.5, &tags(&[("cycleway", "track")])), 25.0);
    }

    #[test]
    fn unknown_value_keeps_length() {
        assert_eq!(infr_length(12.5, &tags(&[("cycleway", "residential")])), 12.5);
        assert_eq!(infr_length(12.5, &tags(&[("cycleway:both", "no")])), 12.5);
    }

    #[test]
    fn both_sides_must_qualify() {
        let both = tags(&[("cycleway:left", "lane"), ("cycleway:right", "track")]);
        let one_missing = tags(&[("cycleway:left", "lane")]);
        let one_invalid = tags(&[("cycleway:left", "lane"), ("cycleway:right", "no")]);

        assert_eq!(infr_length(10.0, &both), 20.0);
        assert_eq!(infr_length(10.0, &one_missing), 10.0);
        assert_eq!(infr_length(10.0, &one_invalid), 10.0);
    }

    #[test]
    fn later_rule_applies_when_earlier_key_is_invalid() {
        let t = tags(&[("cycleway", "shared_lane"), ("cycleway:both", "opposite_lane")]);
        assert_eq!(infr_length(3.0, &t), 6.0);
    }

    #[test]
    fn applying_twice_is_idempotent() {
        let row = |t: Tags| {
            LineFeature::new(line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)], t, None, None)
        };
        let table = Table::new(
            Crs::AUSTRIA_LAMBERT,
            vec![
                row(tags(&[("cycleway", "track")])),
                row(tags(&[("highway", "cycleway")])),
            ],
        );

        let once = apply_infr_length(table);
        let twice = apply_infr_length(once.clone());

        assert_eq!(once, twice);
        assert_eq!(once.rows[0].infr_length, 10.0);
        assert_eq!(once.rows[1].infr_length, 5.0);
    }
}
