use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::error::DataError;
use super::model::{MeasurementTable, CITY, DATE};

// ---------------------------------------------------------------------------
// Filter predicate: city membership and date interval
// ---------------------------------------------------------------------------

/// Row predicates chosen by the user.  `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewFilter {
    /// Keep rows whose city is in the set.  An empty set keeps nothing.
    pub cities: Option<BTreeSet<String>>,
    /// Inclusive `[start, end]`.
    pub date_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

impl ViewFilter {
    pub fn for_city(city: &str) -> Self {
        ViewFilter {
            cities: Some(BTreeSet::from([city.to_string()])),
            date_range: None,
        }
    }

    pub fn with_date_range(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.date_range = Some((start, end));
        self
    }
}

/// Widen calendar-day bounds to an inclusive range covering both whole days.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let midnight = NaiveTime::default();
    let end_of_day = end.and_time(midnight) + Duration::days(1) - Duration::nanoseconds(1);
    (start.and_time(midnight), end_of_day)
}

/// Return a copy of the rows that pass the filter.
///
/// A row passes when:
/// * no city set is given, or its city is in the set (a null city fails)
/// * no date range is given, the table has no `date` column, or its date
///   lies within the inclusive range (a null date fails)
///
/// The source table is never touched; the result may be empty.
pub fn filter(table: &MeasurementTable, predicate: &ViewFilter) -> Result<MeasurementTable, DataError> {
    if predicate.cities.is_some() {
        table.require_column(CITY)?;
    }
    let date_range = predicate.date_range.filter(|_| table.has_column(DATE));

    let rows = table
        .rows
        .iter()
        .filter(|row| {
            if let Some(cities) = &predicate.cities {
                match &row.city {
                    Some(city) if cities.contains(city) => {}
                    _ => return false,
                }
            }
            if let Some((start, end)) = date_range {
                match row.date {
                    Some(d) if start <= d && d <= end => {}
                    _ => return false,
                }
            }
            true
        })
        .cloned()
        .collect();

    Ok(table.with_rows(rows))
}

/// One city's rows sorted ascending by date.
///
/// The sort is stable, so rows sharing a date keep their original order;
/// rows without a date go last.
pub fn city_series(table: &MeasurementTable, city: &str) -> Result<MeasurementTable, DataError> {
    let mut view = filter(table, &ViewFilter::for_city(city))?;
    view.rows.sort_by_key(|row| (row.date.is_none(), row.date));
    Ok(view)
}
