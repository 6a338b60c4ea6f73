//! Post-processing of conflation (matcher) output.
//!
//! Matchers split edges into short segments that each carry the id of the
//! edge they belong to. [`group_by_edge_id`] puts those segments back
//! together so the result follows the edge-node model again.

use geo::{Coord, LineString};
use hashbrown::HashMap;
use itertools::Itertools;
use log::debug;

use crate::model::{LineFeature, NodeId, Table};
use crate::prep::apply_infr_length;

fn endpoints(line: &LineString<f64>) -> Option<(NodeId, NodeId)> {
    let first = line.0.first()?;
    let last = line.0.last()?;
    Some((NodeId::from_coord(*first), NodeId::from_coord(*last)))
}

/// Finds an unused line touching `node`, and whether it must be reversed to
/// continue from there
fn next_line(lines: &[LineString<f64>], used: &[bool], node: NodeId) -> Option<(usize, bool)> {
    lines.iter().enumerate().find_map(|(idx, line)| {
        if used[idx] {
            return None;
        }
        let (first, last) = endpoints(line)?;
        if first == node {
            Some((idx, false))
        } else if last == node {
            Some((idx, true))
        } else {
            None
        }
    })
}

fn extend_forward(
    coords: &mut Vec<Coord<f64>>,
    lines: &[LineString<f64>],
    used: &mut [bool],
    degree: &HashMap<NodeId, usize>,
) {
    while let Some(tail) = coords.last().copied().map(NodeId::from_coord)
        && degree.get(&tail) == Some(&2)
        && let Some((idx, reversed)) = next_line(lines, used, tail)
    {
        used[idx] = true;
        let mut next = lines[idx].0.clone();
        if reversed {
            next.reverse();
        }
        coords.extend(next.into_iter().skip(1));
    }
}

/// Joins lines end to end through endpoints shared by exactly two lines.
///
/// Endpoints where three or more lines meet stay split, so a forked set of
/// segments yields several lines.
pub fn merge_lines(lines: Vec<LineString<f64>>) -> Vec<LineString<f64>> {
    let lines: Vec<_> = lines.into_iter().filter(|l| l.0.len() >= 2).collect();

    let mut degree: HashMap<NodeId, usize> = HashMap::new();
    for (first, last) in lines.iter().filter_map(endpoints) {
        *degree.entry(first).or_default() += 1;
        *degree.entry(last).or_default() += 1;
    }

    let mut used = vec![false; lines.len()];
    let mut merged = Vec::new();
    for start in 0..lines.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let mut coords = lines[start].0.clone();
        extend_forward(&mut coords, &lines, &mut used, &degree);
        coords.reverse();
        extend_forward(&mut coords, &lines, &mut used, &degree);
        coords.reverse();

        merged.push(LineString::new(coords));
    }
    merged
}

/// Merges segments that share the value of `edge_id_key` back into edges.
///
/// Every group takes its attributes from its first segment. Groups come out
/// ordered by edge id, followed by segments without an edge id in their
/// original order. Lengths are recomputed from the merged geometry.
pub fn group_by_edge_id(table: Table<LineFeature>, edge_id_key: &str) -> Table<LineFeature> {
    let crs = table.crs;
    let (keyed, unkeyed): (Vec<_>, Vec<_>) = table
        .rows
        .into_iter()
        .map(|row| (row.tags.get(edge_id_key).cloned(), row))
        .partition(|(key, _)| key.is_some());

    let groups = keyed
        .into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .chunk_by(|(key, _)| key.clone());

    let mut rows = Vec::new();
    for (key, group) in &groups {
        let segments: Vec<LineFeature> = group.map(|(_, row)| row).collect();
        let Some(template) = segments.first().cloned() else {
            continue;
        };
        let count = segments.len();
        let merged = merge_lines(segments.into_iter().map(|row| row.geometry).collect());
        debug!(
            "edge {} merged from {count} segment(s) into {} line(s)",
            key.unwrap_or_default(),
            merged.len()
        );

        rows.extend(merged.into_iter().map(|geometry| {
            let mut row = LineFeature::new(
                geometry,
                template.tags.clone(),
                template.version,
                template.timestamp,
            );
            row.infr_class = template.infr_class;
            row
        }));
    }
    rows.extend(unkeyed.into_iter().map(|(_, row)| row));

    apply_infr_length(Table::new(crs, rows))
}
