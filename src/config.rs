//! Configuration Module
//! Run settings loaded from an optional JSON file, falling back to defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "catalog_insights.json";

/// Columns whose missing values are replaced by the fill value.
pub const DEFAULT_FILL_COLUMNS: [&str; 6] =
    ["director", "cast", "country", "date_added", "rating", "duration"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Settings for a full analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub chart_dir: PathBuf,
    pub render_charts: bool,
    pub report_path: Option<PathBuf>,
    pub top_n: usize,
    pub forecast_years: Vec<i32>,
    /// Columns whose name starts with this marker are index artifacts.
    pub unnamed_prefix: String,
    pub fill_value: String,
    pub fill_columns: Vec<String>,
    pub kde_grid_size: usize,
    pub kde_cut: f64,
    pub log_level: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("netflix_titles.csv"),
            output_path: PathBuf::from("netflix_titles_cleaned.csv"),
            chart_dir: PathBuf::from("charts"),
            render_charts: true,
            report_path: Some(PathBuf::from("analysis_report.json")),
            top_n: 10,
            forecast_years: vec![2025, 2026, 2027],
            unnamed_prefix: "Unnamed".to_string(),
            fill_value: "Unknown".to_string(),
            fill_columns: DEFAULT_FILL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            kde_grid_size: 200,
            kde_cut: 3.0,
            log_level: "info".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Load config from `path` if the file exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|err| match err {
            ConfigError::Json { source, .. } => ConfigError::Json {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Json {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::Invalid("top_n must be at least 1".into()));
        }
        if self.kde_grid_size < 2 {
            return Err(ConfigError::Invalid(
                "kde_grid_size must be at least 2".into(),
            ));
        }
        if self.kde_cut.is_nan() || self.kde_cut < 0.0 {
            return Err(ConfigError::Invalid("kde_cut must be non-negative".into()));
        }
        if self.forecast_years.is_empty() {
            return Err(ConfigError::Invalid(
                "forecast_years must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = AnalysisConfig::default();
        assert_eq!(config.forecast_years, vec![2025, 2026, 2027]);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.fill_columns.len(), 6);
        assert_eq!(config.fill_value, "Unknown");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            AnalysisConfig::from_json(r#"{"top_n": 5, "input_path": "data/titles.csv"}"#)
                .unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.input_path, PathBuf::from("data/titles.csv"));
        assert_eq!(config.output_path, PathBuf::from("netflix_titles_cleaned.csv"));
        assert_eq!(config.kde_grid_size, 200);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"top_n": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"forecast_years": []}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{"kde_cut": -0.5}"#),
            Err(ConfigError::Invalid(_))
        ));
        let config = AnalysisConfig {
            kde_cut: f64::NAN,
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            AnalysisConfig::from_json("not json"),
            Err(ConfigError::Json { .. })
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnalysisConfig::load_or_default(dir.path().join("absent.json")).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"forecast_years": [2030], "render_charts": false}"#).unwrap();
        let config = AnalysisConfig::load_or_default(&path).unwrap();
        assert_eq!(config.forecast_years, vec![2030]);
        assert!(!config.render_charts);
    }
}
