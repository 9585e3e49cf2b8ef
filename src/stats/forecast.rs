//! Trend Forecaster Module
//! Fits a least-squares line to yearly addition counts and extrapolates.

use crate::data::{CatalogTable, YEAR_ADDED};
use crate::stats::AnalysisError;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Ordinary least-squares line `count = slope * year + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `(x, y)` points. Needs at least two distinct x values.
    pub fn fit(points: &[(f64, f64)]) -> Option<Self> {
        let n = points.len() as f64;
        if points.len() < 2 {
            return None;
        }

        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

        let sxx = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum::<f64>();
        if sxx == 0.0 {
            return None;
        }
        let sxy = points
            .iter()
            .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
            .sum::<f64>();

        let slope = sxy / sxx;
        Some(Self {
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Yearly history, fitted line and predictions for the requested years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub history: Vec<(i32, usize)>,
    pub fit: LinearFit,
    pub fitted: Vec<(i32, f64)>,
    pub predictions: Vec<(i32, f64)>,
}

pub struct TrendForecaster;

impl TrendForecaster {
    /// Rows per non-null `year_added`, ascending by year.
    pub fn yearly_counts(table: &CatalogTable) -> Result<Vec<(i32, usize)>, AnalysisError> {
        let column = table.frame().column(YEAR_ADDED)?.cast(&DataType::Int32)?;
        let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
        for year in column.i32()?.into_iter().flatten() {
            *counts.entry(year).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    /// Fit the yearly trend and predict counts for `future_years`.
    ///
    /// Fails with `InsufficientData` when fewer than two distinct years exist.
    pub fn forecast(
        table: &CatalogTable,
        future_years: &[i32],
    ) -> Result<Forecast, AnalysisError> {
        let history = Self::yearly_counts(table)?;
        Self::forecast_history(history, future_years)
    }

    pub fn forecast_history(
        history: Vec<(i32, usize)>,
        future_years: &[i32],
    ) -> Result<Forecast, AnalysisError> {
        let points: Vec<(f64, f64)> = history
            .iter()
            .map(|&(year, count)| (year as f64, count as f64))
            .collect();
        let fit = LinearFit::fit(&points).ok_or(AnalysisError::InsufficientData {
            distinct_years: history.len(),
        })?;

        info!(
            "Trend fit over {} years: slope {:.3}, intercept {:.3}",
            history.len(),
            fit.slope,
            fit.intercept
        );

        let fitted = history
            .iter()
            .map(|&(year, _)| (year, fit.predict(year as f64)))
            .collect();
        let predictions = future_years
            .iter()
            .map(|&year| (year, fit.predict(year as f64)))
            .collect();

        Ok(Forecast {
            history,
            fit,
            fitted,
            predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_years_and_skips_nulls() {
        let df = df!(YEAR_ADDED => [Some(2020i32), None, Some(2019), Some(2020)]).unwrap();
        let counts = TrendForecaster::yearly_counts(&CatalogTable::new(df)).unwrap();
        assert_eq!(counts, vec![(2019, 1), (2020, 2)]);
    }

    #[test]
    fn exact_line_is_recovered() {
        let history = vec![(2018, 10), (2019, 20), (2020, 30)];
        let forecast = TrendForecaster::forecast_history(history, &[2025, 2026, 2027]).unwrap();

        assert!((forecast.fit.slope - 10.0).abs() < 1e-9);
        let expected = [80.0, 90.0, 100.0];
        for ((year, value), want) in forecast.predictions.iter().zip(expected) {
            assert!((value - want).abs() < 1e-6, "{year}: {value}");
        }
        assert_eq!(forecast.fitted.len(), 3);
    }

    #[test]
    fn increasing_history_forecasts_upwards() {
        let history = vec![(2015, 3), (2016, 40), (2017, 90), (2018, 300), (2019, 700), (2020, 800)];
        let last = history.last().unwrap().1 as f64;
        let forecast = TrendForecaster::forecast_history(history, &[2025, 2026, 2027]).unwrap();

        assert!(forecast.fit.slope > 0.0);
        assert!(forecast.predictions.iter().all(|(_, v)| *v >= last));
        let years: Vec<i32> = forecast.predictions.iter().map(|(y, _)| *y).collect();
        assert_eq!(years, vec![2025, 2026, 2027]);
    }

    #[test]
    fn predictions_are_not_rounded() {
        let forecast =
            TrendForecaster::forecast_history(vec![(2019, 1), (2020, 2), (2021, 4)], &[2022])
                .unwrap();
        let (_, value) = forecast.predictions[0];
        assert!(value.fract() != 0.0);
    }

    #[test]
    fn single_year_is_insufficient() {
        let df = df!(YEAR_ADDED => [Some(2020i32), Some(2020), None]).unwrap();
        let err = TrendForecaster::forecast(&CatalogTable::new(df), &[2025]).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::InsufficientData { distinct_years: 1 }
        ));
    }
}
