use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::message::Message;
use crate::model::run_state::{GameMode, RunState};

pub const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSave {
    pub version: u32,
    pub mode: GameMode,
    pub state: RunState,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl GameSave {
    pub fn new(state: RunState, messages: Vec<Message>) -> Self {
        Self {
            version: SAVE_VERSION,
            mode: state.mode,
            state,
            messages,
        }
    }
}

pub fn default_save_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("koica_director_sim");
    path.push("save.json");
    path
}

pub fn save_game(path: &Path, save: &GameSave) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(save)?;
    fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn load_game(path: &Path) -> Result<GameSave> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let save: GameSave = serde_json::from_str(&json)?;
    if save.version != SAVE_VERSION {
        bail!(
            "save version {} is not supported (expected {})",
            save.version,
            SAVE_VERSION
        );
    }
    Ok(save)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("save.json");

        let mut state = RunState::new(GameMode::Generative);
        state.stats.reputation = 77;
        state.clock.advance();
        let save = GameSave::new(state.clone(), vec![Message::System("saved".into())]);

        save_game(&path, &save).unwrap();
        let loaded = load_game(&path).unwrap();
        assert_eq!(loaded.mode, GameMode::Generative);
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.messages.len(), 1);
    }

    #[test]
    fn rejects_future_versions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        let mut save = GameSave::new(RunState::new(GameMode::Static), Vec::new());
        save.version = 99;
        save_game(&path, &save).unwrap();
        assert!(load_game(&path).is_err());
    }
}
