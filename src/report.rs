//! Analysis Report Module
//! Collects every aggregation over the cleaned table into one value.

use crate::config::AnalysisConfig;
use crate::data::CatalogTable;
use crate::stats::{
    AdditionsHeatmap, Aggregator, AnalysisError, DensityCurve, DensityEstimator, Forecast,
    TrendForecaster, ValueCounts,
};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub rows: usize,
    pub columns: Vec<String>,
    pub type_distribution: ValueCounts,
    pub top_countries: ValueCounts,
    pub top_genres: ValueCounts,
    pub top_directors: ValueCounts,
    pub release_year_density: Option<DensityCurve>,
    pub additions_heatmap: AdditionsHeatmap,
    pub top_actors: ValueCounts,
    pub forecast: Option<Forecast>,
}

impl AnalysisReport {
    /// Run all aggregations and the trend forecast.
    ///
    /// A degenerate release-year sample or too few distinct years skip the
    /// density curve or forecast respectively; other failures propagate.
    pub fn build(table: &CatalogTable, config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let n = config.top_n;

        let type_distribution = Aggregator::type_distribution(table)?;
        let top_countries = Aggregator::top_countries(table, n)?;
        let top_genres = Aggregator::top_genres(table, n)?;
        let top_directors = Aggregator::top_directors(table, n)?;
        let top_actors = Aggregator::top_actors(table, n)?;
        info!(
            "Aggregated {} types, {} countries, {} genres, {} directors, {} actors",
            type_distribution.len(),
            top_countries.len(),
            top_genres.len(),
            top_directors.len(),
            top_actors.len()
        );

        let release_years = Aggregator::release_year_values(table)?;
        let release_year_density = match DensityEstimator::gaussian_kde(
            "release_year",
            &release_years,
            config.kde_grid_size,
            config.kde_cut,
        ) {
            Ok(curve) => Some(curve),
            Err(AnalysisError::DegenerateSample { column, reason }) => {
                warn!("Skipping density of {}: {}", column, reason);
                None
            }
            Err(e) => return Err(e),
        };

        let additions_heatmap = Aggregator::additions_heatmap(table)?;
        info!(
            "Heatmap covers {} years, {} dated rows",
            additions_heatmap.years.len(),
            additions_heatmap.total()
        );

        let forecast = match TrendForecaster::forecast(table, &config.forecast_years) {
            Ok(forecast) => Some(forecast),
            Err(e @ AnalysisError::InsufficientData { .. }) => {
                warn!("Skipping forecast: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            rows: table.height(),
            columns: table.column_names(),
            type_distribution,
            top_countries,
            top_genres,
            top_directors,
            release_year_density,
            additions_heatmap,
            top_actors,
            forecast,
        })
    }

    /// One-line prediction summary, e.g. for the console.
    pub fn prediction_line(&self) -> Option<String> {
        let forecast = self.forecast.as_ref()?;
        let years: Vec<String> = forecast
            .predictions
            .iter()
            .map(|(year, _)| year.to_string())
            .collect();
        let values: Vec<String> = forecast
            .predictions
            .iter()
            .map(|(_, value)| format!("{:.2}", value))
            .collect();
        Some(format!(
            "Predicted content additions for {}: [{}]",
            years.join(", "),
            values.join(", ")
        ))
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()
    }
}
