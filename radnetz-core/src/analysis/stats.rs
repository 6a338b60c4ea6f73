//! Length totals, match proportions and distribution summaries

use serde::Serialize;

use crate::model::features::Measured;
use crate::model::infra::ClassFilter;

use super::{LengthColumn, round_half_even};

fn total<M: Measured>(rows: &[M], filter: ClassFilter, column: LengthColumn) -> f64 {
    rows.iter()
        .filter(|row| filter.matches(row.infr_class()))
        .map(|row| column.of(row))
        .sum()
}

/// Total length of the rows matching `filter`, in kilometres rounded to
/// three decimals (the table's unit is assumed to be metres)
pub fn class_length_km<M: Measured>(rows: &[M], filter: ClassFilter, column: LengthColumn) -> f64 {
    round_half_even(total(rows, filter, column) / 1000.0, 3)
}

/// Percentage of length matched between two datasets, rounded to one
/// decimal.
///
/// Returns `None` when neither table has any length to compare.
pub fn match_proportion<M: Measured>(
    matched: &[M],
    unmatched: &[M],
    column: LengthColumn,
    filter: ClassFilter,
) -> Option<f64> {
    let matched = total(matched, filter, column);
    let unmatched = total(unmatched, filter, column);
    let sum = matched + unmatched;
    if sum == 0.0 {
        return None;
    }
    Some(round_half_even(100.0 * matched / sum, 1))
}

/// Median and lower quantiles of a distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceStatistics {
    pub median: f64,
    pub q25: f64,
    pub q10: f64,
}

/// Quantile with linear interpolation between the closest ranks
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    sorted[lower] + (sorted[upper] - sorted[lower]) * (pos - lower as f64)
}

/// Median, 0.25 and 0.1 quantile of `values`; NaN values are ignored
pub fn distance_statistics(values: &[f64]) -> Option<DistanceStatistics> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    Some(DistanceStatistics {
        median: quantile(&sorted, 0.5),
        q25: quantile(&sorted, 0.25),
        q10: quantile(&sorted, 0.1),
    })
}
