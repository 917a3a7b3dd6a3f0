//! Core of the AQI dashboard: loading, filtering, aggregation and the
//! numeric analyses shown by the desktop front-end.

pub mod analysis;
pub mod chem;
pub mod config;
pub mod data;
