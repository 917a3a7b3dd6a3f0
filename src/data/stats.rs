use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::DataError;
use super::model::{MeasurementTable, CITY};

// ---------------------------------------------------------------------------
// Scalar summary
// ---------------------------------------------------------------------------

/// Summary statistics of one numeric column over a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Rows in the view.
    pub count: usize,
    /// Rows with a usable number in the column.
    pub valid: usize,
    /// `None` when `valid == 0`.
    pub mean: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    /// Fold values left to right so identical input gives bit-identical output.
    fn from_values(count: usize, values: impl Iterator<Item = Option<f64>>) -> Self {
        let mut valid = 0usize;
        let mut sum = 0.0;
        let mut min: Option<f64> = None;
        let mut max: Option<f64> = None;

        for v in values.flatten() {
            valid += 1;
            sum += v;
            min = Some(min.map_or(v, |m| m.min(v)));
            max = Some(max.map_or(v, |m| m.max(v)));
        }

        // sum / n can round just outside the observed bounds
        let mean = match (min, max) {
            (Some(lo), Some(hi)) => Some((sum / valid as f64).clamp(lo, hi)),
            _ => None,
        };

        Summary {
            count,
            valid,
            mean,
            min,
            max,
        }
    }
}

/// Mean / min / max / count of `column` over `view`.
pub fn summarize(view: &MeasurementTable, column: &str) -> Result<Summary, DataError> {
    view.require_column(column)?;
    Ok(Summary::from_values(
        view.len(),
        view.rows.iter().map(|r| r.number(column)),
    ))
}

// ---------------------------------------------------------------------------
// Grouped summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub key: String,
    pub summary: Summary,
}

/// [`summarize`] per distinct value of `group_column`, sorted by key.
/// Rows with an empty group key are left out.
pub fn group_summarize(
    table: &MeasurementTable,
    group_column: &str,
    value_column: &str,
) -> Result<Vec<GroupSummary>, DataError> {
    table.require_column(group_column)?;
    table.require_column(value_column)?;

    let mut groups: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    for row in &table.rows {
        let key = row.display(group_column);
        if key.is_empty() {
            continue;
        }
        groups.entry(key).or_default().push(row.number(value_column));
    }

    Ok(groups
        .into_iter()
        .map(|(key, values)| GroupSummary {
            summary: Summary::from_values(values.len(), values.into_iter()),
            key,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// Dataset overview
// ---------------------------------------------------------------------------

/// Shape of a loaded dataset, for the data tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub rows: usize,
    /// Sorted distinct cities; `None` without a `city` column.
    pub cities: Option<Vec<String>>,
    pub date_span: Option<(NaiveDateTime, NaiveDateTime)>,
    pub columns: Vec<String>,
}

pub fn overview(table: &MeasurementTable) -> Overview {
    Overview {
        rows: table.len(),
        cities: table
            .has_column(CITY)
            .then(|| table.cities().into_iter().collect()),
        date_span: table.date_span(),
        columns: table.columns.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, ViewFilter};
    use crate::data::loader::load_csv_bytes;
    use crate::data::model::{AQI, DATE};
    use proptest::prelude::*;

    const CSV: &str = "\
date,city,AQI,PM10
2024-01-01,Delhi,180,210
2024-01-02,Delhi,220,
2024-01-01,Mumbai,90,60
2024-01-02,Mumbai,,70
2024-01-03,,100,80
";

    #[test]
    fn summary_skips_null_cells() {
        let table = load_csv_bytes(CSV.as_bytes()).unwrap();
        let s = summarize(&table, AQI).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.valid, 4);
        assert_eq!(s.mean, Some(147.5));
        assert_eq!(s.min, Some(90.0));
        assert_eq!(s.max, Some(220.0));
    }

    #[test]
    fn mean_of_equal_values_stays_within_bounds() {
        let table = load_csv_bytes(b"city,AQI\nX,0.1\nX,0.1\nX,0.1\n").unwrap();
        let s = summarize(&table, AQI).unwrap();
        assert_eq!(s.min, Some(0.1));
        assert_eq!(s.max, Some(0.1));
        assert_eq!(s.mean, Some(0.1));
    }

    #[test]
    fn empty_view_has_degenerate_summary() {
        let table = load_csv_bytes(CSV.as_bytes()).unwrap();
        let view = filter(&table, &ViewFilter::for_city("Oslo")).unwrap();
        let s = summarize(&view, AQI).unwrap();
        assert_eq!(s.count, 0);
        assert_eq!((s.mean, s.min, s.max), (None, None, None));
    }

    #[test]
    fn missing_aqi_is_a_schema_error_but_filtering_works() {
        let table = load_csv_bytes(b"date,city,PM10\n2024-01-01,Delhi,200\n2024-01-01,Agra,150\n").unwrap();
        assert_eq!(summarize(&table, AQI), Err(DataError::missing(AQI)));
        assert_eq!(group_summarize(&table, CITY, AQI), Err(DataError::missing(AQI)));

        let view = filter(&table, &ViewFilter::for_city("Agra")).unwrap();
        assert_eq!(view.len(), 1);
        assert_eq!(summarize(&view, "PM10").unwrap().mean, Some(150.0));
    }

    #[test]
    fn groups_are_sorted_by_key() {
        let table = load_csv_bytes(CSV.as_bytes()).unwrap();
        let groups = group_summarize(&table, CITY, AQI).unwrap();
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["Delhi", "Mumbai"]);
        assert_eq!(groups[0].summary.mean, Some(200.0));
        assert_eq!(groups[1].summary.count, 2);
        assert_eq!(groups[1].summary.valid, 1);
    }

    #[test]
    fn overview_describes_the_table() {
        let table = load_csv_bytes(CSV.as_bytes()).unwrap();
        let o = overview(&table);
        assert_eq!(o.rows, 5);
        assert_eq!(o.cities, Some(vec!["Delhi".to_string(), "Mumbai".to_string()]));
        let (start, end) = o.date_span.unwrap();
        assert_eq!(start.format("%Y-%m-%d").to_string(), "2024-01-01");
        assert_eq!(end.format("%Y-%m-%d").to_string(), "2024-01-03");
        assert_eq!(o.columns[0], DATE);

        let no_city = load_csv_bytes(b"AQI\n1\n").unwrap();
        assert_eq!(overview(&no_city).cities, None);
    }

    proptest! {
        #[test]
        fn summary_bounds(values in proptest::collection::vec(-1.0e6f64..1.0e6, 0..50)) {
            let mut csv = String::from("city,AQI\n");
            for v in &values {
                csv.push_str(&format!("X,{v}\n"));
            }
            let table = load_csv_bytes(csv.as_bytes()).unwrap();
            let s = summarize(&table, AQI).unwrap();

            prop_assert_eq!(s.count, table.len());
            if s.count > 0 {
                let (min, mean, max) = (s.min.unwrap(), s.mean.unwrap(), s.max.unwrap());
                prop_assert!(min <= mean && mean <= max);
            }
        }

        #[test]
        fn summary_is_deterministic(values in proptest::collection::vec(-1.0e3f64..1.0e3, 1..30)) {
            let mut csv = String::from("city,AQI\n");
            for v in &values {
                csv.push_str(&format!("X,{v}\n"));
            }
            let table = load_csv_bytes(csv.as_bytes()).unwrap();
            let a = summarize(&table, AQI).unwrap();
            let b = summarize(&table.clone(), AQI).unwrap();
            prop_assert_eq!(a.mean.map(f64::to_bits), b.mean.map(f64::to_bits));
        }
    }
}
