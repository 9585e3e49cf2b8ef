//! Static Chart Renderer
//! Writes each chart description to a PNG file with plotters.
//!
//! Charts are rendered in parallel. A chart that fails to render is logged
//! and skipped; it never aborts the run.

use crate::charts::plotter::{ChartBody, ChartData};
use crate::stats::{AdditionsHeatmap, Forecast, ValueCounts};
use plotters::coord::ranged1d::SegmentValue;
use plotters::element::Pie;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create chart directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Chart {chart} has no data")]
    Empty { chart: String },
    #[error("Failed to draw {chart}: {message}")]
    Drawing { chart: String, message: String },
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";
const CHART_SIZE: (u32, u32) = (1000, 700);
const MAX_LABEL_CHARS: usize = 24;
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Sequential blue scale for the heatmap (light to dark)
const HEAT_LOW: (f64, f64, f64) = (247.0, 251.0, 255.0);
const HEAT_HIGH: (f64, f64, f64) = (8.0, 48.0, 107.0);

/// Outcome of rendering a batch of charts.
#[derive(Debug, Default)]
pub struct RenderSummary {
    pub written: Vec<PathBuf>,
    pub failed: usize,
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render every chart into `dir`, one PNG per chart.
    pub fn render_all(charts: &[ChartData], dir: &Path) -> Result<RenderSummary, RenderError> {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let results: Vec<Result<PathBuf, RenderError>> = charts
            .par_iter()
            .map(|chart| {
                let path = dir.join(chart.file_name());
                Self::render_chart(chart, &path).map(|_| path)
            })
            .collect();

        let mut summary = RenderSummary::default();
        for result in results {
            match result {
                Ok(path) => {
                    info!("Wrote chart {}", path.display());
                    summary.written.push(path);
                }
                Err(e) => {
                    warn!("{}", e);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    /// Render a single chart to `path`.
    pub fn render_chart(chart: &ChartData, path: &Path) -> Result<(), RenderError> {
        if chart.is_empty() {
            return Err(RenderError::Empty {
                chart: chart.key.clone(),
            });
        }

        let result = match &chart.body {
            ChartBody::Pie { slices, colors } => Self::draw_pie(chart, slices, colors, path),
            ChartBody::Bar { bars, color } => Self::draw_bars(chart, bars, *color, path),
            ChartBody::HorizontalBar { bars, color } => {
                Self::draw_horizontal_bars(chart, bars, *color, path)
            }
            ChartBody::Line {
                points,
                line,
                marker,
            } => Self::draw_line(chart, points, *line, *marker, path),
            ChartBody::Density { curve, color } => Self::draw_density(chart, curve, *color, path),
            ChartBody::Heatmap { heatmap } => Self::draw_heatmap(chart, heatmap, path),
            ChartBody::Regression {
                forecast,
                points,
                line,
            } => Self::draw_regression(chart, forecast, *points, *line, path),
        };

        result.map_err(|e| RenderError::Drawing {
            chart: chart.key.clone(),
            message: e.to_string(),
        })
    }

    fn draw_pie(
        chart: &ChartData,
        slices: &ValueCounts,
        palette: &[RGBColor],
        path: &Path,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        let area = root.titled(&chart.title, (FONT, 28))?;

        let (w, h) = area.dim_in_pixel();
        let center = (w as i32 / 2, h as i32 / 2);
        let radius = w.min(h) as f64 * 0.35;
        let sizes: Vec<f64> = slices.iter().map(|(_, c)| *c as f64).collect();
        let labels: Vec<&str> = slices.iter().map(|(l, _)| l.as_str()).collect();
        let colors: Vec<RGBColor> = (0..sizes.len())
            .map(|i| palette[i % palette.len()])
            .collect();

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(90.0);
        pie.label_style((FONT, 20).into_font().color(&BLACK));
        pie.percentages((FONT, 18).into_font().color(&WHITE));
        area.draw(&pie)?;

        root.present()?;
        Ok(())
    }

    fn draw_bars(chart: &ChartData, bars: &ValueCounts, color: RGBColor, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let top = Self::headroom(bars.iter().map(|(_, c)| *c).max().unwrap_or(0));
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(170)
            .y_label_area_size(70)
            .build_cartesian_2d((0..bars.len()).into_segmented(), 0..top)?;

        ctx.configure_mesh()
            .disable_x_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(bars.len())
            .x_label_formatter(&|v| Self::segment_label(bars, v))
            .x_label_style((FONT, 14).into_font().transform(FontTransform::Rotate90))
            .draw()?;

        ctx.draw_series(
            Histogram::vertical(&ctx)
                .style(color.filled())
                .margin(8)
                .data(bars.iter().enumerate().map(|(i, (_, c))| (i, *c))),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_horizontal_bars(
        chart: &ChartData,
        bars: &ValueCounts,
        color: RGBColor,
        path: &Path,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let top = Self::headroom(bars.iter().map(|(_, c)| *c).max().unwrap_or(0));
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(230)
            .build_cartesian_2d(0..top, (0..bars.len()).into_segmented())?;

        ctx.configure_mesh()
            .disable_y_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .y_labels(bars.len())
            .y_label_formatter(&|v| Self::segment_label(bars, v))
            .draw()?;

        ctx.draw_series(
            Histogram::horizontal(&ctx)
                .style(color.filled())
                .margin(6)
                .data(bars.iter().enumerate().map(|(i, (_, c))| (i, *c))),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_line(
        chart: &ChartData,
        points: &ValueCounts,
        line: RGBColor,
        marker: RGBColor,
        path: &Path,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let top = Self::headroom(points.iter().map(|(_, c)| *c).max().unwrap_or(0));
        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(200)
            .y_label_area_size(70)
            .build_cartesian_2d((0..points.len()).into_segmented(), 0..top)?;

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(points.len())
            .x_label_formatter(&|v| Self::segment_label(points, v))
            .x_label_style((FONT, 14).into_font().transform(FontTransform::Rotate90))
            .draw()?;

        let coords: Vec<(SegmentValue<usize>, usize)> = points
            .iter()
            .enumerate()
            .map(|(i, (_, c))| (SegmentValue::CenterOf(i), *c))
            .collect();

        ctx.draw_series(LineSeries::new(coords.iter().cloned(), line.stroke_width(2)))?;
        ctx.draw_series(
            coords
                .iter()
                .cloned()
                .map(|coord| Circle::new(coord, 8, marker.filled())),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_density(
        chart: &ChartData,
        curve: &[(f64, f64)],
        color: RGBColor,
        path: &Path,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let x_min = curve.first().map(|p| p.0).unwrap_or(0.0);
        let x_max = curve.last().map(|p| p.0).unwrap_or(1.0);
        let y_max = curve.iter().map(|p| p.1).fold(0.0, f64::max) * 1.1;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_label_formatter(&|x| format!("{:.0}", x))
            .y_label_formatter(&|y| format!("{:.3}", y))
            .draw()?;

        ctx.draw_series(
            AreaSeries::new(curve.iter().copied(), 0.0, color.mix(0.3))
                .border_style(color.stroke_width(2)),
        )?;

        root.present()?;
        Ok(())
    }

    fn draw_heatmap(chart: &ChartData, heatmap: &AdditionsHeatmap, path: &Path) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let n_years = heatmap.years.len();
        let max = heatmap.max().max(1) as f64;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d(
                (0..n_years).into_segmented(),
                (0..AdditionsHeatmap::MONTHS).into_segmented(),
            )?;

        ctx.configure_mesh()
            .disable_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .x_labels(n_years)
            .y_labels(AdditionsHeatmap::MONTHS)
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => heatmap
                    .years
                    .get(*i)
                    .map(|y| y.to_string())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|v| match v {
                // January is drawn in the top row
                SegmentValue::CenterOf(i) if *i < AdditionsHeatmap::MONTHS => {
                    MONTH_NAMES[AdditionsHeatmap::MONTHS - 1 - *i].to_string()
                }
                _ => String::new(),
            })
            .draw()?;

        let mut cells = Vec::with_capacity(n_years * AdditionsHeatmap::MONTHS);
        let mut labels = Vec::with_capacity(cells.capacity());
        for (month_idx, row) in heatmap.cells.iter().enumerate() {
            let y = AdditionsHeatmap::MONTHS - 1 - month_idx;
            for (x, &count) in row.iter().enumerate() {
                let t = count as f64 / max;
                cells.push(Rectangle::new(
                    [
                        (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                        (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
                    ],
                    Self::heat_color(t).filled(),
                ));

                let text_color = if t > 0.6 { WHITE } else { BLACK };
                labels.push(Text::new(
                    count.to_string(),
                    (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
                    (FONT, 13)
                        .into_font()
                        .color(&text_color)
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                ));
            }
        }
        ctx.draw_series(cells)?;
        ctx.draw_series(labels)?;

        root.present()?;
        Ok(())
    }

    fn draw_regression(
        chart: &ChartData,
        forecast: &Forecast,
        point_color: RGBColor,
        line_color: RGBColor,
        path: &Path,
    ) -> DrawResult {
        let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let years = forecast
            .history
            .iter()
            .map(|(y, _)| *y)
            .chain(forecast.predictions.iter().map(|(y, _)| *y));
        let x_min = years.clone().min().unwrap_or(0) - 1;
        let x_max = years.max().unwrap_or(0) + 1;

        let values = forecast
            .history
            .iter()
            .map(|(_, c)| *c as f64)
            .chain(forecast.fitted.iter().map(|(_, v)| *v))
            .chain(forecast.predictions.iter().map(|(_, v)| *v));
        let y_min = values.clone().fold(0.0, f64::min);
        let y_max = values.fold(1.0, f64::max) * 1.1;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, (FONT, 28))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        ctx.configure_mesh()
            .x_desc(&chart.x_label)
            .y_desc(&chart.y_label)
            .draw()?;

        ctx.draw_series(
            forecast
                .history
                .iter()
                .map(|&(year, count)| Circle::new((year, count as f64), 6, point_color.filled())),
        )?
        .label("Actual Data")
        .legend(move |(x, y)| Circle::new((x, y), 5, point_color.filled()));

        ctx.draw_series(LineSeries::new(
            forecast.fitted.iter().copied(),
            line_color.stroke_width(3),
        ))?
        .label("Regression Line")
        .legend(move |(x, y)| PathElement::new(vec![(x - 10, y), (x + 10, y)], line_color.stroke_width(3)));

        ctx.draw_series(
            forecast
                .predictions
                .iter()
                .map(|&(year, value)| TriangleMarker::new((year, value), 8, line_color.filled())),
        )?
        .label("Predicted")
        .legend(move |(x, y)| TriangleMarker::new((x, y), 6, line_color.filled()));

        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }

    /// Axis top with a little space above the tallest bar.
    fn headroom(max: usize) -> usize {
        max + max / 10 + 1
    }

    fn segment_label(items: &ValueCounts, value: &SegmentValue<usize>) -> String {
        match value {
            SegmentValue::CenterOf(i) => items
                .get(*i)
                .map(|(label, _)| Self::truncate_label(label))
                .unwrap_or_default(),
            _ => String::new(),
        }
    }

    fn truncate_label(label: &str) -> String {
        if label.chars().count() <= MAX_LABEL_CHARS {
            return label.to_string();
        }
        let mut short: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        short.push('…');
        short
    }

    fn heat_color(t: f64) -> RGBColor {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
        RGBColor(
            lerp(HEAT_LOW.0, HEAT_HIGH.0),
            lerp(HEAT_LOW.1, HEAT_HIGH.1),
            lerp(HEAT_LOW.2, HEAT_HIGH.2),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_are_truncated() {
        let long = "International TV Shows, Romantic Dramas";
        let short = StaticChartRenderer::truncate_label(long);
        assert_eq!(short.chars().count(), MAX_LABEL_CHARS);
        assert!(short.ends_with('…'));
        assert_eq!(StaticChartRenderer::truncate_label("Dramas"), "Dramas");
    }

    #[test]
    fn heat_scale_spans_light_to_dark() {
        assert_eq!(StaticChartRenderer::heat_color(0.0), RGBColor(247, 251, 255));
        assert_eq!(StaticChartRenderer::heat_color(1.0), RGBColor(8, 48, 107));
        assert_eq!(StaticChartRenderer::heat_color(5.0), RGBColor(8, 48, 107));
    }

    #[test]
    fn segment_labels_map_centers_only() {
        let items: ValueCounts = vec![("Dramas".into(), 2), ("Comedies".into(), 1)];
        assert_eq!(
            StaticChartRenderer::segment_label(&items, &SegmentValue::CenterOf(1)),
            "Comedies"
        );
        assert_eq!(
            StaticChartRenderer::segment_label(&items, &SegmentValue::Exact(0)),
            ""
        );
        assert_eq!(
            StaticChartRenderer::segment_label(&items, &SegmentValue::CenterOf(9)),
            ""
        );
    }

    #[test]
    fn empty_chart_is_rejected_before_drawing() {
        let chart = ChartData {
            key: "top_actors".into(),
            title: "Top 10 Actors".into(),
            x_label: String::new(),
            y_label: String::new(),
            body: ChartBody::Bar {
                bars: vec![],
                color: RGBColor(0, 0, 0),
            },
        };
        let dir = tempfile::tempdir().unwrap();
        let err = StaticChartRenderer::render_chart(&chart, &dir.path().join("x.png")).unwrap_err();
        assert!(matches!(err, RenderError::Empty { .. }));
    }
}
