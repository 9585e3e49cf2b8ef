//! Density Estimation Module
//! Gaussian kernel density estimate with Scott's rule bandwidth.

use crate::stats::AnalysisError;
use serde::Serialize;
use statrs::distribution::{Continuous, Normal};

/// Density curve evaluated on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub points: Vec<(f64, f64)>,
}

impl DensityCurve {
    /// Trapezoidal integral of the curve over its grid.
    #[cfg(test)]
    pub fn area(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum()
    }

    /// Grid point with the highest density.
    #[cfg(test)]
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }
}

pub struct DensityEstimator;

impl DensityEstimator {
    /// Scott's rule: sample std (ddof = 1) scaled by n^(-1/5).
    pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std = variance.sqrt();
        if std <= 0.0 || !std.is_finite() {
            return None;
        }
        Some(std * (n as f64).powf(-0.2))
    }

    /// Evaluate a Gaussian KDE on `grid_size` points spanning
    /// `[min - cut * bw, max + cut * bw]`.
    pub fn gaussian_kde(
        column: &str,
        values: &[f64],
        grid_size: usize,
        cut: f64,
    ) -> Result<DensityCurve, AnalysisError> {
        let bandwidth =
            Self::scott_bandwidth(values).ok_or_else(|| AnalysisError::DegenerateSample {
                column: column.to_string(),
                reason: format!(
                    "need at least 2 distinct values, got {} values",
                    values.len()
                ),
            })?;
        if grid_size < 2 {
            return Err(AnalysisError::DegenerateSample {
                column: column.to_string(),
                reason: "grid needs at least 2 points".to_string(),
            });
        }

        let kernel = Normal::new(0.0, 1.0).map_err(|e| AnalysisError::DegenerateSample {
            column: column.to_string(),
            reason: e.to_string(),
        })?;

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = min - cut * bandwidth;
        let hi = max + cut * bandwidth;
        let step = (hi - lo) / (grid_size - 1) as f64;
        let norm = values.len() as f64 * bandwidth;

        let points = (0..grid_size)
            .map(|i| {
                let x = lo + step * i as f64;
                let density = values
                    .iter()
                    .map(|v| kernel.pdf((x - v) / bandwidth))
                    .sum::<f64>()
                    / norm;
                (x, density)
            })
            .collect();

        Ok(DensityCurve { bandwidth, points })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bandwidth_follows_scott_rule() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bw = DensityEstimator::scott_bandwidth(&values).unwrap();
        let expected = 2.5f64.sqrt() * 5f64.powf(-0.2);
        assert!((bw - expected).abs() < 1e-12);
    }

    #[test]
    fn density_integrates_to_one() {
        let values: Vec<f64> = (0..200).map(|i| 1990.0 + (i % 30) as f64).collect();
        let curve = DensityEstimator::gaussian_kde("release_year", &values, 400, 3.0).unwrap();
        assert_eq!(curve.points.len(), 400);
        assert!((curve.area() - 1.0).abs() < 0.01, "area = {}", curve.area());
        assert!(curve.points.iter().all(|(_, d)| *d >= 0.0));
    }

    #[test]
    fn peak_sits_near_the_mode() {
        let mut values = vec![2020.0; 50];
        values.extend([1980.0, 2000.0, 2010.0]);
        let curve = DensityEstimator::gaussian_kde("release_year", &values, 200, 3.0).unwrap();
        let (x, _) = curve.peak().unwrap();
        assert!((x - 2020.0).abs() < 2.0, "peak at {x}");
    }

    #[test]
    fn degenerate_samples_are_rejected() {
        assert!(matches!(
            DensityEstimator::gaussian_kde("release_year", &[2020.0], 200, 3.0),
            Err(AnalysisError::DegenerateSample { .. })
        ));
        assert!(matches!(
            DensityEstimator::gaussian_kde("release_year", &[2020.0, 2020.0], 200, 3.0),
            Err(AnalysisError::DegenerateSample { .. })
        ));
        assert_eq!(DensityEstimator::scott_bandwidth(&[1.0, f64::NAN]), None);
    }
}
