//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::{ChangeSeries, ChartPlotter};
pub use renderer::StaticChartRenderer;
