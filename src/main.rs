mod app;
mod color;
mod state;
mod ui;

use std::path::Path;

use app::AqiDashboardApp;
use aqi_dashboard::config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));
    let [width, height] = config.window_size;

    let mut state = AppState::new(config);
    state.load_default();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "AQI Analysis Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(AqiDashboardApp::new(state)))),
    )
}
