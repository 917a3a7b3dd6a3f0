use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::DataError;

// ---------------------------------------------------------------------------
// Column vocabulary
// ---------------------------------------------------------------------------

pub const CITY: &str = "city";
pub const DATE: &str = "date";
pub const AQI: &str = "AQI";

/// Pollutant columns, in display order.
pub const POLLUTANTS: [&str; 6] = ["PM2_5", "PM10", "NO2", "SO2", "O3", "CO"];

/// Whether a column belongs to the numeric vocabulary (`AQI` + pollutants).
/// Cells of these columns are coerced to numbers; anything else becomes null.
pub fn is_numeric_column(name: &str) -> bool {
    name == AQI || POLLUTANTS.contains(&name)
}

// ---------------------------------------------------------------------------
// CellValue – a single cell outside of `city` / `date`
// ---------------------------------------------------------------------------

/// A loosely-typed cell.  Vocabulary columns only ever hold `Number` or
/// `Null`; pass-through columns keep whatever type could be guessed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Measurement – one row of the table
// ---------------------------------------------------------------------------

/// One row: a city's readings for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub city: Option<String>,
    /// `None` when the column is missing or the text did not parse.
    pub date: Option<NaiveDateTime>,
    /// Every other column: column_name → value.
    pub values: BTreeMap<String, CellValue>,
}

impl Measurement {
    /// Numeric value of `column`, `None` for null / non-numeric / absent.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.values.get(column).and_then(CellValue::as_f64)
    }

    /// Text rendering of any column, including `city` and `date`.
    pub fn display(&self, column: &str) -> String {
        match column {
            CITY => self.city.clone().unwrap_or_default(),
            DATE => self
                .date
                .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            other => match self.values.get(other) {
                Some(CellValue::Null) | None => String::new(),
                Some(v) => v.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// MeasurementTable – the loaded dataset, and every view derived from it
// ---------------------------------------------------------------------------

/// A loaded table, or a filtered copy of one.  Never mutated after load.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MeasurementTable {
    /// Column names in header order (including `city` / `date`).
    pub columns: Vec<String>,
    pub rows: Vec<Measurement>,
}

impl MeasurementTable {
    pub fn new(columns: Vec<String>, rows: Vec<Measurement>) -> Self {
        MeasurementTable { columns, rows }
    }

    /// Schema-capability query; every feature is gated on it.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Fail with [`DataError::MissingColumn`] unless `name` is present.
    pub fn require_column(&self, name: &str) -> Result<(), DataError> {
        if self.has_column(name) {
            Ok(())
        } else {
            Err(DataError::missing(name))
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A copy with the same columns and the given rows.
    pub fn with_rows(&self, rows: Vec<Measurement>) -> Self {
        MeasurementTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[Measurement] {
        &self.rows[..n.min(self.rows.len())]
    }

    /// Pollutant columns present, in vocabulary order.
    pub fn pollutant_columns(&self) -> Vec<&'static str> {
        POLLUTANTS
            .iter()
            .copied()
            .filter(|p| self.has_column(p))
            .collect()
    }

    /// Sorted distinct non-null cities.
    pub fn cities(&self) -> BTreeSet<String> {
        self.rows.iter().filter_map(|r| r.city.clone()).collect()
    }

    /// Earliest and latest non-null date.
    pub fn date_span(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut dates = self.rows.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Numeric column values in row order, nulls kept as `None`.
    pub fn numeric_column(&self, column: &str) -> Result<Vec<Option<f64>>, DataError> {
        self.require_column(column)?;
        Ok(self.rows.iter().map(|r| r.number(column)).collect())
    }
}

/// Unwrap an optionally loaded table, reporting [`DataError::NoData`].
pub fn require(table: Option<&MeasurementTable>) -> Result<&MeasurementTable, DataError> {
    table.ok_or(DataError::NoData)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 1, d).and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    fn row(city: &str, d: u32, aqi: Option<f64>) -> Measurement {
        let mut values = BTreeMap::new();
        values.insert(
            AQI.to_string(),
            aqi.map(CellValue::Number).unwrap_or(CellValue::Null),
        );
        Measurement {
            city: Some(city.to_string()),
            date: day(d),
            values,
        }
    }

    fn table() -> MeasurementTable {
        MeasurementTable::new(
            vec![DATE.into(), CITY.into(), AQI.into()],
            vec![row("Pune", 3, Some(80.0)), row("Delhi", 1, None), row("Pune", 2, Some(90.0))],
        )
    }

    #[test]
    fn has_column_reflects_header() {
        let t = table();
        assert!(t.has_column(AQI));
        assert!(!t.has_column("PM10"));
        assert_eq!(t.require_column("PM10"), Err(DataError::missing("PM10")));
        assert!(t.pollutant_columns().is_empty());
    }

    #[test]
    fn cities_and_date_span() {
        let t = table();
        let cities: Vec<_> = t.cities().into_iter().collect();
        assert_eq!(cities, vec!["Delhi", "Pune"]);
        assert_eq!(t.date_span(), Some((day(1).unwrap(), day(3).unwrap())));
        assert_eq!(MeasurementTable::default().date_span(), None);
    }

    #[test]
    fn numeric_column_keeps_nulls() {
        let t = table();
        assert_eq!(t.numeric_column(AQI).unwrap(), vec![Some(80.0), None, Some(90.0)]);
        assert!(t.numeric_column("SO2").is_err());
    }

    #[test]
    fn require_reports_no_data() {
        assert_eq!(require(None), Err(DataError::NoData));
        let t = table();
        assert!(require(Some(&t)).is_ok());
    }

    #[test]
    fn non_finite_is_not_a_number() {
        assert_eq!(CellValue::Number(f64::NAN).as_f64(), None);
        assert_eq!(CellValue::Number(f64::INFINITY).as_f64(), None);
        assert_eq!(CellValue::Text("12".into()).as_f64(), None);
    }
}
