/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  upload bytes / aqi_data_180_days.csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Option<MeasurementTable>
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ MeasurementTable  │  Vec<Measurement>, header order
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  city set + date range → copied view
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  summaries, per-group summaries, overview
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;

pub use error::DataError;
pub use model::{CellValue, Measurement, MeasurementTable};
