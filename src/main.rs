mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = koica_sim::engine::config::load_config();
    let settings = ui::settings_io::load_settings();
    tracing::info!(mode = ?config.mode, "starting");

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "KOICA Office Director",
        options,
        Box::new(|_cc| Ok(Box::new(ui::app::MyApp::new(config, settings)))),
    )
}
