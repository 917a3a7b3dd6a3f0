use chrono::NaiveDateTime;
use serde::Serialize;

use crate::data::{DataError, MeasurementTable};

/// One non-null reading of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub date: Option<NaiveDateTime>,
    pub value: f64,
}

/// First difference, aligned to the later point of each pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatePoint {
    pub date: Option<NaiveDateTime>,
    pub delta: f64,
}

/// The readings of a numeric column in view order, nulls dropped.
pub fn series(view: &MeasurementTable, column: &str) -> Result<Vec<SeriesPoint>, DataError> {
    view.require_column(column)?;
    Ok(view
        .rows
        .iter()
        .filter_map(|row| {
            row.number(column).map(|value| SeriesPoint {
                date: row.date,
                value,
            })
        })
        .collect())
}

/// Trapezoidal integral over a unit-spaced index: `Σ (y[i-1] + y[i]) / 2`.
///
/// Gaps between dates are ignored; every step counts as one day.
/// Fewer than two points integrate to `0`.
pub fn cumulative_exposure(values: &[f64]) -> f64 {
    values
        .windows(2)
        .fold(0.0, |acc, w| acc + (w[0] + w[1]) / 2.0)
}

/// `y[i] - y[i-1]` for `i = 1..n`; one element shorter than the input.
pub fn rate_of_change(points: &[SeriesPoint]) -> Vec<RatePoint> {
    points
        .windows(2)
        .map(|w| RatePoint {
            date: w[1].date,
            delta: w[1].value - w[0].value,
        })
        .collect()
}
