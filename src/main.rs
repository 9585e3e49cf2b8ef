//! Catalog Insights - catalog CSV cleaning, aggregation & trend forecasting
//!
//! Loads a catalog of titles, cleans it, writes the cleaned table back out,
//! summarises it and forecasts yearly additions.

mod charts;
mod config;
mod data;
mod pipeline;
mod report;
mod stats;

use anyhow::{Context, Result};
use config::{AnalysisConfig, DEFAULT_CONFIG_FILE};
use pipeline::AnalysisPipeline;
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let config = AnalysisConfig::load_or_default(DEFAULT_CONFIG_FILE)
        .with_context(|| format!("loading {}", DEFAULT_CONFIG_FILE))?;

    init_logging(&config.log_level);

    AnalysisPipeline::run(&config)?;
    Ok(())
}
