//! Numeric analyses over a (usually single-city, date-sorted) view.
//!
//! Every function here is pure: it reads a view and returns plain numbers.
//! Degenerate input yields a defined trivial result or
//! [`DataError::NotEnoughData`](crate::data::DataError::NotEnoughData).

pub mod correlation;
pub mod covariance;
pub mod exposure;
pub mod histogram;
pub mod report;

pub use correlation::{correlation_columns, correlation_matrix, linear_fit, paired, CorrelationMatrix, LinearFit};
pub use covariance::{pollutant_covariance, CovarianceReport, EigenComponent};
pub use exposure::{cumulative_exposure, rate_of_change, series, RatePoint, SeriesPoint};
pub use histogram::{histogram, HistogramBin};
pub use report::{CityReport, DatasetReport};
