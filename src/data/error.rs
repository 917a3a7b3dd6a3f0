use thiserror::Error;

/// Recoverable conditions reported by the core.  None of them is fatal: the
/// front-end shows the message in place of the feature that needed the data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// No uploaded file and no default dataset.
    #[error("no data loaded: open a CSV file or place aqi_data_180_days.csv next to the executable")]
    NoData,

    /// A feature needs a column the dataset does not have.
    #[error("this view needs a '{0}' column, which the dataset does not contain")]
    MissingColumn(String),

    /// Too few points / columns for a numeric analysis.
    #[error("not enough data for {what}: need at least {needed}, got {got}")]
    NotEnoughData {
        what: &'static str,
        needed: usize,
        got: usize,
    },
}

impl DataError {
    pub fn missing(column: &str) -> Self {
        DataError::MissingColumn(column.to_string())
    }
}
