mod chart_view;
mod config;
mod data_source;
mod notice;
mod stats_panel;
mod ui;
mod video_player;
mod video_reader;

use config::AppConfig;
use eframe::egui;
use tracing_subscriber::EnvFilter;
use ui::VehicleCountApp;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::default();
    tracing::info!(data_file = %config.data_file.display(), "starting vehicle count viewer");

    // Configure the application's native options, like window size
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_title(config.window_title),
        ..Default::default()
    };

    eframe::run_native(
        config.window_title,
        options,
        Box::new(|_cc| Ok(Box::new(VehicleCountApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))
}
