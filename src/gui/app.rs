//! Income Trend Viewer
//! Single window showing the change chart for the selected ZIP code.

use crate::charts::{ChangeSeries, ChartPlotter};
use egui::{RichText, TopBottomPanel};

/// Main application window.
pub struct TrendApp {
    series: ChangeSeries,
}

impl TrendApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, series: ChangeSeries) -> Self {
        Self { series }
    }

    /// Open the window and block until it is closed.
    pub fn run(series: ChangeSeries) -> eframe::Result<()> {
        let title = series.title();
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([900.0, 600.0])
                .with_min_inner_size([480.0, 320.0])
                .with_title(&title),
            ..Default::default()
        };

        eframe::run_native(
            &title,
            options,
            Box::new(move |cc| Ok(Box::new(TrendApp::new(cc, series)))),
        )
    }
}

impl eframe::App for TrendApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        TopBottomPanel::top("title").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(RichText::new(self.series.title()).size(18.0).strong());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.series.is_empty() {
                ui.label(RichText::new("No Data").size(14.0).weak());
            }
            ChartPlotter::draw_change_chart(ui, &self.series);
        });
    }
}
