use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::DEFAULT_DATASET;

/// Optional override file looked up in the working directory.
pub const CONFIG_FILE: &str = "aqi_dashboard.json";

/// Dashboard settings.  Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Dataset loaded at start-up when nothing has been opened.
    pub default_dataset: PathBuf,
    pub histogram_bins: usize,
    /// Rows shown in the raw-data preview.
    pub preview_rows: usize,
    pub window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            default_dataset: PathBuf::from(DEFAULT_DATASET),
            histogram_bins: 30,
            preview_rows: 20,
            window_size: [1280.0, 860.0],
        }
    }
}

impl DashboardConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Defaults, overridden by `path` if it exists.  A broken file is logged
    /// and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.is_file() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => {
                log::info!("Using settings from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Ignoring {}: {e:#}", path.display());
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_file_keeps_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{ "histogram_bins": 12 }"#)?;

        let config = DashboardConfig::load_or_default(&path);
        assert_eq!(config.histogram_bins, 12);
        assert_eq!(config.default_dataset, PathBuf::from(DEFAULT_DATASET));
        assert_eq!(config.preview_rows, 20);
        Ok(())
    }

    #[test]
    fn missing_or_broken_file_gives_defaults() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());

        std::fs::write(&path, "{ not json")?;
        assert!(DashboardConfig::from_file(&path).is_err());
        assert_eq!(DashboardConfig::load_or_default(&path), DashboardConfig::default());
        Ok(())
    }
}
