mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use anyhow::Result;
use app::HouseInsightsApp;
use config::{DashboardConfig, SEED_ENV_VAR};
use eframe::egui;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from_args_and_env(
        std::env::args().skip(1),
        std::env::var(SEED_ENV_VAR).ok(),
    )?;
    log::info!(
        "Dataset {}, boundaries {}",
        config.dataset_path.display(),
        config.boundary_source
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "House Insights – Portfolio Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(HouseInsightsApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
