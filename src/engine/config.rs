use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::run_state::GameMode;

pub const APP_DIR: &str = "koica_director_sim";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token, if any.
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234/v1/chat/completions".into(),
            model: "local-model".into(),
            api_key_env: None,
            timeout_secs: 30,
            max_attempts: 2,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mode: GameMode,
    pub llm: LlmConfig,
    /// Replaces the embedded scenario file.
    pub content_path: Option<PathBuf>,
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// `KOICA_LLM_ENDPOINT`, `KOICA_LLM_MODEL` and `KOICA_SEED` win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("KOICA_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Some(model) = lookup("KOICA_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(seed) = lookup("KOICA_SEED") {
            match seed.trim().parse() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => tracing::warn!(value = %seed, "ignoring non-numeric KOICA_SEED"),
            }
        }
    }
}

pub fn config_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    fs::create_dir_all(&path).ok();
    path.push("engine.json");
    path
}

/// Missing or unreadable files fall back to defaults.
pub fn load_config_from(path: &Path) -> EngineConfig {
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
            tracing::warn!(path = %path.display(), error = %err, "invalid engine config, using defaults");
            EngineConfig::default()
        }),
        Err(_) => EngineConfig::default(),
    }
}

pub fn load_config() -> EngineConfig {
    let mut config = load_config_from(&config_path());
    config.apply_env_overrides(|key| std::env::var(key).ok());
    config
}

pub fn save_config_to(path: &Path, config: &EngineConfig) {
    if let Ok(json) = serde_json::to_string_pretty(config) {
        if let Err(err) = fs::write(path, json) {
            tracing::warn!(path = %path.display(), error = %err, "failed to save engine config");
        }
    }
}

pub fn save_config(config: &EngineConfig) {
    save_config_to(&config_path(), config);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_broken_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(load_config_from(&missing), EngineConfig::default());

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ this is not json").unwrap();
        assert_eq!(load_config_from(&broken), EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"mode": "generative", "llm": {"max_attempts": 5}}"#).unwrap();
        let config = load_config_from(&path);
        assert_eq!(config.mode, GameMode::Generative);
        assert_eq!(config.llm.max_attempts, 5);
        assert_eq!(config.llm.timeout_secs, 30);
    }

    #[test]
    fn saved_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        let mut config = EngineConfig::default();
        config.seed = Some(42);
        save_config_to(&path, &config);
        assert_eq!(load_config_from(&path), config);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = EngineConfig::default();
        config.apply_env_overrides(|key| match key {
            "KOICA_LLM_MODEL" => Some("gpt-test".into()),
            "KOICA_SEED" => Some("7".into()),
            _ => None,
        });
        assert_eq!(config.llm.model, "gpt-test");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.llm.endpoint, LlmConfig::default().endpoint);
    }
}
