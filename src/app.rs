use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::{AppState, ReportTab};
use crate::ui::{map, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HouseInsightsApp {
    pub state: AppState,
}

impl HouseInsightsApp {
    /// Build the app and load the configured sources once.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_configured_sources();
        Self { state }
    }
}

impl eframe::App for HouseInsightsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar + report tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a dataset to start  (File → Open dataset…)");
                });
                return;
            }
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| match self.state.active_tab {
                    ReportTab::Overview => table::overview(ui, &self.state),
                    ReportTab::Density => map::density(ui, &self.state),
                    ReportTab::Commercial => plot::commercial(ui, &self.state),
                    ReportTab::Attributes => plot::attributes(ui, &self.state),
                });
        });
    }
}
