use crate::data::model::{AQI, CITY};
use crate::data::stats::{group_summarize, overview, summarize, GroupSummary, Overview, Summary};
use crate::data::{DataError, MeasurementTable};

use super::correlation::{correlation_columns, correlation_matrix, CorrelationMatrix};
use super::covariance::{pollutant_covariance, CovarianceReport};
use super::exposure::{cumulative_exposure, rate_of_change, series, RatePoint, SeriesPoint};
use super::histogram::{histogram, HistogramBin};

/// Whole-dataset results for the data tab.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetReport {
    pub overview: Overview,
    pub aqi_histogram: Result<Vec<HistogramBin>, DataError>,
    pub city_means: Result<Vec<GroupSummary>, DataError>,
}

impl DatasetReport {
    pub fn compute(table: &MeasurementTable, bins: usize) -> Self {
        let aqi_histogram = table.numeric_column(AQI).map(|values| {
            let values: Vec<f64> = values.into_iter().flatten().collect();
            histogram(&values, bins)
        });

        DatasetReport {
            overview: overview(table),
            aqi_histogram,
            city_means: group_summarize(table, CITY, AQI),
        }
    }
}

/// Everything derived from one city's date-sorted, date-filtered view.
/// Each part fails on its own; the others are still shown.
#[derive(Debug, Clone, PartialEq)]
pub struct CityReport {
    pub summary: Result<Summary, DataError>,
    pub aqi: Result<Vec<SeriesPoint>, DataError>,
    pub exposure: Result<f64, DataError>,
    pub rate_of_change: Result<Vec<RatePoint>, DataError>,
    pub correlation: Result<CorrelationMatrix, DataError>,
    pub covariance: Result<CovarianceReport, DataError>,
}

impl CityReport {
    pub fn compute(view: &MeasurementTable) -> Self {
        let aqi = series(view, AQI);

        let exposure = aqi.clone().map(|pts| {
            let values: Vec<f64> = pts.iter().map(|p| p.value).collect();
            cumulative_exposure(&values)
        });
        let rates = aqi.clone().and_then(|pts| {
            if pts.len() < 2 {
                Err(DataError::NotEnoughData {
                    what: "rate of change (AQI readings)",
                    needed: 2,
                    got: pts.len(),
                })
            } else {
                Ok(rate_of_change(&pts))
            }
        });

        CityReport {
            summary: summarize(view, AQI),
            exposure,
            rate_of_change: rates,
            aqi,
            correlation: correlation_matrix(view, &correlation_columns(view)),
            covariance: pollutant_covariance(view),
        }
    }
}
