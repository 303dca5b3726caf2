//! Static Chart Renderer
//! Writes the income change chart to a PNG image with plotters.
//!
//! Layout:
//! 1. Caption: "Percentage Change in AGI for ZIP Code {zip}"
//! 2. Line series of change_pct over year with circle markers
//! 3. Axes: Year (x), Percentage Change in AGI (y)

use crate::charts::ChangeSeries;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;
use tracing::info;

const LINE_COLOR: RGBColor = RGBColor(52, 152, 219);
const MARKER_SIZE: u32 = 4;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Draw(err.to_string())
    }
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Axis ranges covering every defined point, padded so single points
    /// and flat series still get a visible extent.
    pub fn axis_ranges(series: &ChangeSeries) -> (Range<i64>, Range<f64>) {
        let years: Vec<i64> = series.points.iter().map(|&(year, _)| year).collect();
        let (x_min, x_max) = match (years.iter().min(), years.iter().max()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (0, 1),
        };

        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for (_, v) in series.segments().into_iter().flatten() {
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
        if y_min.is_infinite() {
            return (x_min..x_max + 1, -1.0..1.0);
        }

        let pad = ((y_max - y_min) * 0.1).max(1.0);
        (x_min..x_max + 1, (y_min - pad)..(y_max + pad))
    }

    /// Render the chart for `series` into a PNG file at `path`.
    pub fn render_png(
        series: &ChangeSeries,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_range, y_range) = Self::axis_ranges(series);
        let mut chart = ChartBuilder::on(&root)
            .caption(series.title(), ("sans-serif", 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Percentage Change in AGI")
            .x_label_formatter(&|year| year.to_string())
            .draw()?;

        for segment in series.segments() {
            chart.draw_series(LineSeries::new(segment.iter().copied(), &LINE_COLOR))?;
            chart.draw_series(
                segment
                    .iter()
                    .map(|&point| Circle::new(point, MARKER_SIZE, LINE_COLOR.filled())),
            )?;
        }

        root.present()?;
        info!(path = %path.display(), "wrote chart image");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn series(points: Vec<(i64, Option<f64>)>) -> ChangeSeries {
        ChangeSeries {
            zip_code: "10001".to_string(),
            points,
        }
    }

    #[test]
    fn ranges_cover_defined_points() {
        let (x, y) = StaticChartRenderer::axis_ranges(&series(vec![
            (2018, None),
            (2019, Some(50.0)),
            (2020, Some(-20.0)),
        ]));
        assert_eq!(x, 2018..2021);
        assert!(y.start < -20.0 && y.end > 50.0);
    }

    #[test]
    fn empty_series_has_default_ranges() {
        let (x, y) = StaticChartRenderer::axis_ranges(&series(Vec::new()));
        assert_eq!(x, 0..2);
        assert_eq!(y, -1.0..1.0);
    }

    /// Needs system fonts for the caption and axis labels.
    #[test]
    #[ignore]
    fn renders_png_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chart.png");
        StaticChartRenderer::render_png(
            &series(vec![(2018, None), (2019, Some(50.0)), (2020, Some(-20.0))]),
            &path,
            (800, 500),
        )
        .unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }
}
