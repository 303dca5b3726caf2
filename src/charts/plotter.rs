//! Chart Plotter Module
//! Draws the year-over-year income change chart using egui_plot.

use crate::data::YEAR_COL;
use crate::stats::CHANGE_PCT_COL;
use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};
use polars::prelude::*;

pub const LINE_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue

/// Percentage change in AGI over time for a single ZIP code.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeSeries {
    pub zip_code: String,
    /// (year, change_pct) sorted by year; `None` where the change is undefined.
    pub points: Vec<(i64, Option<f64>)>,
}

impl ChangeSeries {
    /// Build from a frame already filtered to one ZIP and sorted by year.
    pub fn from_frame(zip_code: &str, df: &DataFrame) -> PolarsResult<Self> {
        let years = df.column(YEAR_COL)?.cast(&DataType::Int64)?;
        let changes = df.column(CHANGE_PCT_COL)?.cast(&DataType::Float64)?;

        let points = years
            .i64()?
            .into_iter()
            .zip(changes.f64()?)
            .filter_map(|(year, change)| year.map(|y| (y, change)))
            .collect();

        Ok(Self {
            zip_code: zip_code.to_string(),
            points,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Runs of consecutive defined points. A `None` change breaks the line.
    pub fn segments(&self) -> Vec<Vec<(i64, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for &(year, change) in &self.points {
            match change {
                Some(v) if v.is_finite() => current.push((year, v)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    pub fn title(&self) -> String {
        format!("Percentage Change in AGI for ZIP Code {}", self.zip_code)
    }
}

/// Creates the change chart using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw change_pct over year as a line with point markers.
    pub fn draw_change_chart(ui: &mut egui::Ui, series: &ChangeSeries) {
        Plot::new(format!("change_{}", series.zip_code))
            .legend(Legend::default())
            .x_axis_label("Year")
            .y_axis_label("Percentage Change in AGI")
            .x_axis_formatter(|mark, _range| {
                if mark.value.fract() == 0.0 {
                    format!("{}", mark.value as i64)
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for segment in series.segments() {
                    let points: Vec<[f64; 2]> =
                        segment.iter().map(|&(x, y)| [x as f64, y]).collect();

                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(LINE_COLOR)
                            .width(2.0)
                            .name(&series.zip_code),
                    );

                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(4.0)
                            .color(LINE_COLOR),
                    );
                }
            });
    }
}
