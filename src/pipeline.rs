//! Analysis Pipeline Module
//! Composes load, clean, persist, aggregate, forecast, report and render.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::config::AnalysisConfig;
use crate::data::{DataCleaner, DataLoader};
use crate::report::AnalysisReport;
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Runs a full analysis from a config.
pub struct AnalysisPipeline;

impl AnalysisPipeline {
    pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
        let raw = DataLoader::load_csv(&config.input_path)
            .with_context(|| format!("loading {}", config.input_path.display()))?;
        let table = DataCleaner::clean(raw, config).context("cleaning catalog table")?;
        DataLoader::persist(&table, &config.output_path)
            .with_context(|| format!("writing {}", config.output_path.display()))?;

        println!("{}", table.summary());

        let report = AnalysisReport::build(&table, config).context("aggregating catalog")?;
        if let Some(line) = report.prediction_line() {
            println!("{}", line);
        }

        if let Some(path) = &config.report_path {
            report
                .write_json(path)
                .with_context(|| format!("writing report {}", path.display()))?;
            info!("Wrote report to {}", path.display());
        }

        if config.render_charts {
            let charts = ChartData::from_report(&report);
            let summary = StaticChartRenderer::render_all(&charts, &config.chart_dir)
                .context("rendering charts")?;
            if summary.failed > 0 {
                warn!(
                    "{} of {} charts could not be rendered",
                    summary.failed,
                    charts.len()
                );
            }
            info!(
                "Rendered {} charts to {}",
                summary.written.len(),
                config.chart_dir.display()
            );
        }

        Ok(report)
    }
}
