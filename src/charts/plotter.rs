//! Chart Description Module
//! Turns aggregation outputs into chart descriptions for the renderer.

use crate::report::AnalysisReport;
use crate::stats::{AdditionsHeatmap, Forecast, ValueCounts};
use plotters::style::RGBColor;

/// Pie slice colours, cycled when there are more slices than colours.
pub const PIE_COLORS: [RGBColor; 2] = [RGBColor(0x66, 0x98, 0xFF), RGBColor(0x87, 0xCE, 0xFA)];
pub const COUNTRY_COLOR: RGBColor = RGBColor(0x00, 0xBF, 0xFF);
pub const GENRE_LINE_COLOR: RGBColor = RGBColor(0x14, 0xA3, 0xC7);
pub const GENRE_MARKER_COLOR: RGBColor = RGBColor(0x66, 0x98, 0xFF);
pub const DIRECTOR_COLOR: RGBColor = RGBColor(0x72, 0x8F, 0xCE);
pub const DENSITY_COLOR: RGBColor = RGBColor(0x14, 0xA3, 0xC7);
pub const ACTOR_COLOR: RGBColor = RGBColor(0x12, 0x34, 0x56);
pub const SCATTER_COLOR: RGBColor = RGBColor(0x36, 0x8B, 0xC1);
pub const REGRESSION_COLOR: RGBColor = RGBColor(0x19, 0x19, 0x70);

/// What to draw for a single chart.
#[derive(Debug, Clone)]
pub enum ChartBody {
    Pie {
        slices: ValueCounts,
        colors: Vec<RGBColor>,
    },
    Bar {
        bars: ValueCounts,
        color: RGBColor,
    },
    HorizontalBar {
        bars: ValueCounts,
        color: RGBColor,
    },
    Line {
        points: ValueCounts,
        line: RGBColor,
        marker: RGBColor,
    },
    Density {
        curve: Vec<(f64, f64)>,
        color: RGBColor,
    },
    Heatmap {
        heatmap: AdditionsHeatmap,
    },
    Regression {
        forecast: Forecast,
        points: RGBColor,
        line: RGBColor,
    },
}

/// A chart with its display options.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub key: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub body: ChartBody,
}

impl ChartData {
    fn new(key: &str, title: &str, x_label: &str, y_label: &str, body: ChartBody) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            body,
        }
    }

    /// Build every chart the report has data for, in display order.
    pub fn from_report(report: &AnalysisReport) -> Vec<ChartData> {
        let mut charts = vec![
            Self::new(
                "type_distribution",
                "Distribution of Movies vs. TV Shows",
                "",
                "",
                ChartBody::Pie {
                    slices: report.type_distribution.clone(),
                    colors: PIE_COLORS.to_vec(),
                },
            ),
            Self::new(
                "top_countries",
                "Top 10 Countries Producing Content",
                "Country",
                "Count",
                ChartBody::Bar {
                    bars: report.top_countries.clone(),
                    color: COUNTRY_COLOR,
                },
            ),
            Self::new(
                "top_genres",
                "Top 10 Most Common Genres",
                "Genre",
                "Count",
                ChartBody::Line {
                    points: report.top_genres.clone(),
                    line: GENRE_LINE_COLOR,
                    marker: GENRE_MARKER_COLOR,
                },
            ),
            Self::new(
                "top_directors",
                "Top 10 Most Popular Directors",
                "Number of Movies/TV Shows",
                "Director",
                ChartBody::HorizontalBar {
                    bars: report.top_directors.clone(),
                    color: DIRECTOR_COLOR,
                },
            ),
        ];

        if let Some(density) = &report.release_year_density {
            charts.push(Self::new(
                "release_year_density",
                "Distribution of Titles by Release Year (KDE)",
                "Release Year",
                "Density",
                ChartBody::Density {
                    curve: density.points.clone(),
                    color: DENSITY_COLOR,
                },
            ));
        }

        charts.push(Self::new(
            "additions_heatmap",
            "Content Added Per Year (by Month)",
            "Year Added",
            "Month Added",
            ChartBody::Heatmap {
                heatmap: report.additions_heatmap.clone(),
            },
        ));
        charts.push(Self::new(
            "top_actors",
            "Top 10 Actors",
            "Actor Names",
            "Count of Films/Shows",
            ChartBody::Bar {
                bars: report.top_actors.clone(),
                color: ACTOR_COLOR,
            },
        ));

        if let Some(forecast) = &report.forecast {
            charts.push(Self::new(
                "trend_forecast",
                "Content Added Per Year with Linear Trend",
                "Year",
                "Content Added",
                ChartBody::Regression {
                    forecast: forecast.clone(),
                    points: SCATTER_COLOR,
                    line: REGRESSION_COLOR,
                },
            ));
        }

        charts
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        match &self.body {
            ChartBody::Pie { slices, .. } => slices.iter().all(|(_, c)| *c == 0),
            ChartBody::Bar { bars, .. } | ChartBody::HorizontalBar { bars, .. } => bars.is_empty(),
            ChartBody::Line { points, .. } => points.is_empty(),
            ChartBody::Density { curve, .. } => curve.is_empty(),
            ChartBody::Heatmap { heatmap } => heatmap.years.is_empty(),
            ChartBody::Regression { forecast, .. } => forecast.history.is_empty(),
        }
    }

    /// PNG file name derived from the chart key.
    pub fn file_name(&self) -> String {
        let safe_name: String = self
            .key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}.png", safe_name)
    }
}
