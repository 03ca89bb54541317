use std::fs;
use std::path::PathBuf;

use koica_sim::engine::config::APP_DIR;

use crate::ui::settings::UiSettings;

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    fs::create_dir_all(&path).ok();
    path.push("ui_settings.json");
    path
}

pub fn load_settings() -> UiSettings {
    let path = settings_path();
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn save_settings(settings: &UiSettings) {
    let path = settings_path();
    if let Ok(json) = serde_json::to_string_pretty(settings) {
        if let Err(err) = fs::write(&path, json) {
            tracing::warn!(path = %path.display(), error = %err, "failed to save ui settings");
        }
    }
}
