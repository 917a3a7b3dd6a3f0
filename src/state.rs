use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use aqi_dashboard::analysis::{CityReport, DatasetReport};
use aqi_dashboard::chem::POLLUTANT_INFO;
use aqi_dashboard::config::DashboardConfig;
use aqi_dashboard::data::filter::{city_series, day_range, filter, ViewFilter};
use aqi_dashboard::data::loader::{load_file, resolve_table};
use aqi_dashboard::data::model::CITY;
use aqi_dashboard::data::{DataError, MeasurementTable};

use crate::color::CityColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Data,
    Analysis,
    Numerics,
    Chemistry,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None when no source resolved).
    pub table: Option<MeasurementTable>,
    /// Whole-table results, rebuilt on load.
    pub dataset_report: Option<DatasetReport>,
    pub city_colors: CityColors,

    pub selected_city: Option<String>,
    /// Full date span of the selected city.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
    /// User-chosen inclusive date range within `date_bounds`.
    pub date_range: Option<(NaiveDate, NaiveDate)>,

    /// Selected city's rows, date-sorted and date-filtered (cached).
    pub view: Result<MeasurementTable, DataError>,
    pub city_report: Option<CityReport>,

    /// Pollutant plotted against AQI in the scatter chart.
    pub scatter_pollutant: Option<&'static str>,
    /// Pollutant shown on the chemistry tab.
    pub reference_key: &'static str,

    pub tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            table: None,
            dataset_report: None,
            city_colors: CityColors::default(),
            selected_city: None,
            date_bounds: None,
            date_range: None,
            view: Err(DataError::NoData),
            city_report: None,
            scatter_pollutant: None,
            reference_key: POLLUTANT_INFO[0].key,
            tab: Tab::Data,
            status_message: None,
        }
    }

    /// Start-up: load the default dataset if it exists.
    pub fn load_default(&mut self) {
        let path = self.config.default_dataset.clone();
        match resolve_table(None, &path) {
            Ok(table) => self.set_table(table),
            Err(e) => self.report_error("Failed to load default dataset", &e),
        }
    }

    /// Open a user-picked file.  CSV goes through the upload path (an empty
    /// file falls back to the default dataset); other formats by extension.
    pub fn open_file(&mut self, path: &Path) {
        let loaded = read_upload(path, &self.config.default_dataset);
        match loaded {
            Ok(table) => self.set_table(table),
            Err(e) => self.report_error("Failed to load file", &e),
        }
    }

    fn report_error(&mut self, what: &str, e: &anyhow::Error) {
        log::error!("{what}: {e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }

    /// Ingest a newly loaded dataset (or its absence) and reset selections.
    pub fn set_table(&mut self, table: Option<MeasurementTable>) {
        self.status_message = None;
        self.selected_city = None;
        self.date_bounds = None;
        self.date_range = None;

        match &table {
            Some(t) => {
                log::info!("Loaded {} rows with columns {:?}", t.len(), t.columns);
                let cities = t.cities();
                self.city_colors = CityColors::new(&cities);
                self.dataset_report = Some(DatasetReport::compute(t, self.config.histogram_bins));
                self.selected_city = cities.into_iter().next();
                self.scatter_pollutant = t.pollutant_columns().first().copied();
            }
            None => {
                self.city_colors = CityColors::default();
                self.dataset_report = None;
                self.scatter_pollutant = None;
            }
        }

        self.table = table;
        self.reset_date_bounds();
        self.refilter();
    }

    /// Switch city; the date range snaps back to the city's full span.
    pub fn select_city(&mut self, city: String) {
        self.selected_city = Some(city);
        self.reset_date_bounds();
        self.refilter();
    }

    /// Set the inclusive date range, clamped to the city's span.
    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.date_range = Some(match self.date_bounds {
            Some((lo, hi)) => (start.clamp(lo, hi), end.clamp(lo, hi)),
            None => (start, end),
        });
        self.refilter();
    }

    fn reset_date_bounds(&mut self) {
        self.date_bounds = match (&self.table, &self.selected_city) {
            (Some(t), Some(city)) => city_series(t, city)
                .ok()
                .and_then(|v| v.date_span())
                .map(|(lo, hi)| (lo.date(), hi.date())),
            _ => None,
        };
        self.date_range = self.date_bounds;
    }

    /// Recompute the city view and its report after a selection change.
    pub fn refilter(&mut self) {
        self.view = self.city_view();
        self.city_report = self.view.as_ref().ok().map(CityReport::compute);
        if let Err(e) = &self.view {
            log::debug!("City view unavailable: {e}");
        }
    }

    fn city_view(&self) -> Result<MeasurementTable, DataError> {
        let table = self.table.as_ref().ok_or(DataError::NoData)?;
        table.require_column(CITY)?;
        let city = self
            .selected_city
            .as_deref()
            .ok_or(DataError::NotEnoughData {
                what: "city selection (cities)",
                needed: 1,
                got: 0,
            })?;

        let series = city_series(table, city)?;
        match self.date_range {
            Some((start, end)) => {
                let (start, end) = day_range(start, end);
                filter(&series, &ViewFilter::default().with_date_range(start, end))
            }
            None => Ok(series),
        }
    }
}

fn read_upload(path: &Path, default_dataset: &Path) -> Result<Option<MeasurementTable>> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(true, |e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        resolve_table(Some(bytes.as_slice()), default_dataset)
    } else {
        load_file(path).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aqi_dashboard::data::model::AQI;
    use std::path::PathBuf;
    use tempfile::tempdir;

    const CSV: &str = "\
date,city,AQI,PM2_5,PM10
2024-01-01,Delhi,100,50,80
2024-01-02,Delhi,200,90,120
2024-01-03,Delhi,150,70,110
2024-01-01,Agra,60,20,40
2024-01-05,Agra,70,25,45
";

    fn state_with(csv: &str) -> (tempfile::TempDir, AppState) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        std::fs::write(&path, csv).unwrap();

        let config = DashboardConfig {
            default_dataset: dir.path().join("missing.csv"),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config);
        state.open_file(&path);
        (dir, state)
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn no_source_means_no_data() {
        let mut state = AppState::new(DashboardConfig {
            default_dataset: PathBuf::from("/nonexistent/aqi_data_180_days.csv"),
            ..DashboardConfig::default()
        });
        state.load_default();
        assert!(state.table.is_none());
        assert!(state.dataset_report.is_none());
        assert_eq!(state.view, Err(DataError::NoData));
        assert!(state.city_report.is_none());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn load_selects_first_city_and_full_range() {
        let (_dir, state) = state_with(CSV);
        assert_eq!(state.selected_city.as_deref(), Some("Agra"));
        assert_eq!(state.date_bounds, Some((date("2024-01-01"), date("2024-01-05"))));
        assert_eq!(state.date_range, state.date_bounds);
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
        assert_eq!(state.scatter_pollutant, Some("PM2_5"));
    }

    #[test]
    fn date_range_narrows_the_view() {
        let (_dir, mut state) = state_with(CSV);
        state.select_city("Delhi".into());
        assert_eq!(state.city_report.as_ref().unwrap().exposure, Ok(325.0));

        state.set_date_range(date("2024-01-02"), date("2024-01-03"));
        let view = state.view.as_ref().unwrap();
        let aqi: Vec<_> = view.rows.iter().filter_map(|r| r.number(AQI)).collect();
        assert_eq!(aqi, vec![200.0, 150.0]);
        assert_eq!(state.city_report.as_ref().unwrap().exposure, Ok(175.0));
        // source table untouched
        assert_eq!(state.table.as_ref().unwrap().len(), 5);
    }

    #[test]
    fn reversed_range_is_normalised_and_clamped() {
        let (_dir, mut state) = state_with(CSV);
        state.select_city("Delhi".into());
        state.set_date_range(date("2024-02-01"), date("2023-12-01"));
        assert_eq!(state.date_range, Some((date("2024-01-01"), date("2024-01-03"))));
    }

    #[test]
    fn missing_city_column_is_reported_per_feature() {
        let (_dir, state) = state_with("date,AQI\n2024-01-01,100\n");
        assert!(state.table.is_some());
        assert_eq!(state.view, Err(DataError::missing(CITY)));
        let report = state.dataset_report.as_ref().unwrap();
        assert!(report.aqi_histogram.is_ok());
        assert_eq!(report.city_means, Err(DataError::missing(CITY)));
    }

    #[test]
    fn broken_file_sets_status() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ nope").unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.open_file(&path);
        assert!(state.status_message.is_some());
        assert!(state.table.is_none());
    }
}
