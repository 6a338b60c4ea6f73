//! Presence of OSM attributes within a (preselected) dataset

use hashbrown::HashSet;
use log::warn;

use crate::Error;
use crate::model::{LineRecord, Table, Tags};

/// Rows carrying at least one analyzed attribute, next to all rows they
/// were drawn from
#[derive(Debug, Clone, PartialEq)]
pub struct AttributePresence<R> {
    pub with_attribute: Table<R>,
    pub selected: Table<R>,
}

impl<R> AttributePresence<R> {
    pub fn empty(crs: crate::model::Crs) -> Self {
        Self {
            with_attribute: Table::empty(crs),
            selected: Table::empty(crs),
        }
    }

    /// Share of selected rows carrying an analyzed attribute
    #[allow(clippy::cast_precision_loss)]
    pub fn proportion(&self) -> Option<f64> {
        if self.selected.is_empty() {
            None
        } else {
            Some(self.with_attribute.len() as f64 / self.selected.len() as f64)
        }
    }
}

/// Result of an attribute presence analysis
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceOutcome<R> {
    Evaluated(AttributePresence<R>),
    /// A preselection or analyzed key does not occur anywhere in the dataset
    MissingAttribute(String),
    /// The preselection matched no rows
    EmptyPreselection,
}

impl<R> PresenceOutcome<R> {
    /// The evaluated presence, or an empty pair for the recoverable cases
    pub fn into_presence(self, crs: crate::model::Crs) -> AttributePresence<R> {
        match self {
            PresenceOutcome::Evaluated(presence) => presence,
            _ => AttributePresence::empty(crs),
        }
    }
}

fn parse_filter(filter: &str) -> Result<(&str, &str), Error> {
    filter.split_once('=').ok_or_else(|| {
        Error::InvalidData(format!(
            "Preselection '{filter}' is not of the form key=value"
        ))
    })
}

fn has_value(tags: &Tags, key: &str) -> bool {
    tags.get(key).is_some_and(|value| !value.is_empty())
}

/// Evaluates which rows carry any of the `analyze` attributes.
///
/// `preselect` holds `key=value` filters; rows matching any of them form
/// the selection (each row once, in table order). Without filters the whole
/// table is selected. `name` labels the dataset in diagnostics.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for a filter without `=`.
pub fn attribute_presence<R: LineRecord + Clone>(
    table: &Table<R>,
    name: &str,
    preselect: &[String],
    analyze: &[String],
) -> Result<PresenceOutcome<R>, Error> {
    let filters = preselect
        .iter()
        .filter(|f| !f.is_empty())
        .map(|f| parse_filter(f))
        .collect::<Result<Vec<_>, _>>()?;

    let rows: Vec<(Tags, &R)> = table.iter().map(|row| (row.tags(), row)).collect();
    let keys: HashSet<&str> = rows
        .iter()
        .flat_map(|(tags, _)| tags.keys().map(String::as_str))
        .collect();

    let missing = filters
        .iter()
        .map(|(key, _)| *key)
        .chain(analyze.iter().map(String::as_str))
        .find(|key| !keys.contains(key));
    if let Some(key) = missing {
        warn!(
            "At least one of the attribute you are trying to evaluate does not exist in {name} \
             infrastructure dataset ('{key}')."
        );
        return Ok(PresenceOutcome::MissingAttribute(key.to_string()));
    }

    let selected: Vec<&(Tags, &R)> = rows
        .iter()
        .filter(|(tags, _)| {
            filters.is_empty()
                || filters
                    .iter()
                    .any(|(key, value)| tags.get(*key).is_some_and(|v| v == value))
        })
        .collect();

    if !filters.is_empty() && selected.is_empty() {
        warn!(
            "Preselection empty. Selected attribute(s) doesn't exist in {name} infrastructure \
             dataset."
        );
        return Ok(PresenceOutcome::EmptyPreselection);
    }

    let with_attribute = selected
        .iter()
        .filter(|(tags, _)| analyze.iter().any(|key| has_value(tags, key)))
        .map(|(_, row)| (*row).clone())
        .collect();
    let selected = selected.iter().map(|(_, row)| (*row).clone()).collect();

    Ok(PresenceOutcome::Evaluated(AttributePresence {
        with_attribute: Table::new(table.crs, with_attribute),
        selected: Table::new(table.crs, selected),
    }))
}

#[cfg(test)]
mod tests {
    use geo::line_string;

    use crate::model::{Crs, LineFeature};

    use super::*;

    fn feature(pairs: &[(&str, &str)]) -> LineFeature {
        LineFeature::new(
            line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)],
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            None,
            None,
        )
    }

    fn dataset() -> Table<LineFeature> {
        Table::new(
            Crs::WGS84,
            vec![
                feature(&[("highway", "cycleway"), ("surface", "asphalt")]),
                feature(&[("highway", "cycleway")]),
                feature(&[("highway", "residential"), ("cycleway", "lane"), ("width", "")]),
                feature(&[("highway", "path"), ("bicycle", "designated"), ("width", "2")]),
            ],
        )
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn whole_dataset_without_preselection() {
        let outcome =
            attribute_presence(&dataset(), "OSM", &[], &strings(&["surface", "width"])).unwrap();
        let PresenceOutcome::Evaluated(presence) = outcome else {
            panic!("expected evaluation");
        };

        assert_eq!(presence.selected.len(), 4);
        // the empty width value does not count
        assert_eq!(presence.with_attribute.len(), 2);
        assert_eq!(presence.proportion(), Some(0.5));
    }

    #[test]
    fn preselection_is_a_union_of_filters() {
        let outcome = attribute_presence(
            &dataset(),
            "OSM",
            &strings(&["highway=cycleway", "bicycle=designated", "highway=path"]),
            &strings(&["surface"]),
        )
        .unwrap();
        let presence = outcome.into_presence(Crs::WGS84);

        assert_eq!(presence.selected.len(), 3);
        assert_eq!(presence.with_attribute.len(), 1);
    }

    #[test]
    fn missing_key_recovers_with_empty_pair() {
        let outcome = attribute_presence(&dataset(), "OSM", &[], &strings(&["lit"])).unwrap();

        assert_eq!(outcome, PresenceOutcome::MissingAttribute("lit".to_string()));
        let presence = outcome.into_presence(Crs::WGS84);
        assert!(presence.selected.is_empty());
        assert_eq!(presence.proportion(), None);
    }

    #[test]
    fn missing_preselection_key_recovers_with_empty_pair() {
        let outcome = attribute_presence(
            &dataset(),
            "OSM",
            &strings(&["highway=cycleway", "lit=yes"]),
            &strings(&["surface"]),
        )
        .unwrap();

        assert_eq!(outcome, PresenceOutcome::MissingAttribute("lit".to_string()));
        let presence = outcome.into_presence(Crs::WGS84);
        assert!(presence.with_attribute.is_empty());
        assert!(presence.selected.is_empty());
    }

    #[test]
    fn empty_preselection_is_reported() {
        let outcome = attribute_presence(
            &dataset(),
            "OSM",
            &strings(&["highway=motorway"]),
            &strings(&["surface"]),
        )
        .unwrap();

        assert_eq!(outcome, PresenceOutcome::EmptyPreselection);
    }

    #[test]
    fn malformed_filter_is_an_error() {
        let result = attribute_presence(&dataset(), "OSM", &strings(&["highway"]), &[]);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }
}
