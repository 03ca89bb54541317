use thiserror::Error;

use crate::model::lifestyle::LifestyleSlot;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("scenario not found: '{0}'")]
    ScenarioNotFound(String),
    #[error("choice on '{0}' has no next node")]
    NoNextNode(String),
    #[error("choice {index} is out of range for '{node}' ({available} choices)")]
    InvalidChoice {
        node: String,
        index: usize,
        available: usize,
    },
    #[error("the run has already ended")]
    RunEnded,
    #[error("lifestyle setup is incomplete: {0} not chosen")]
    LifestyleIncomplete(LifestyleSlot),
    #[error("{0} has already been chosen")]
    LifestyleAlreadyChosen(LifestyleSlot),
    #[error("the term has already started")]
    AlreadyStarted,
    #[error("the term has not started yet")]
    NotStarted,
    #[error("free-form actions need generative mode with a configured generator")]
    GenerativeUnavailable,
    #[error("action rejected: {0}")]
    ActionRejected(String),
}

impl EngineError {
    /// Errors after which the run cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::ScenarioNotFound(_) | EngineError::NoNextNode(_))
    }
}
