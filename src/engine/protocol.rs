use std::path::PathBuf;

use crate::engine::config::EngineConfig;
use crate::engine::odds::OddsReport;
use crate::engine::session::SessionView;
use crate::model::lifestyle::LifestyleChoice;
use crate::model::run_state::GameMode;

pub enum EngineCommand {
    NewRun { mode: GameMode },
    ChooseLifestyle(LifestyleChoice),
    BeginTerm,
    Choose(usize),
    FreeAction(String),
    Save(PathBuf),
    Load(PathBuf),
    EstimateOdds { samples: u32 },
    TestConnection,
    /// Takes effect from the next run.
    UpdateConfig(EngineConfig),
}

pub enum EngineResponse {
    View(Box<SessionView>),
    Error(String),
    Odds(OddsReport),
    Connection(Result<String, String>),
    Saved(PathBuf),
    Config(EngineConfig),
}
