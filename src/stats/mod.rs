//! Stats module - aggregations, density estimation and trend forecasting

mod aggregations;
mod density;
mod forecast;

pub use aggregations::{AdditionsHeatmap, Aggregator, ValueCounts};
pub use density::{DensityCurve, DensityEstimator};
pub use forecast::{Forecast, TrendForecaster};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Trend fit needs at least 2 distinct years, found {distinct_years}")]
    InsufficientData { distinct_years: usize },
    #[error("Cannot estimate density of {column}: {reason}")]
    DegenerateSample { column: String, reason: String },
}
