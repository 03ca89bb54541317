use serde::{Deserialize, Serialize};

use crate::model::lifestyle::Lifestyle;
use crate::model::run_state::{Clock, HistoryEntry, RunState, StyleCounters};
use crate::model::stats::Stats;

const RECENT_HISTORY: usize = 5;

/// What the scenario generator gets to see of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContext {
    pub clock: Clock,
    pub stats: Stats,
    pub style: StyleCounters,
    pub lifestyle: Lifestyle,
    pub recent_history: Vec<HistoryEntry>,
    pub principled_morale: i32,
    pub local_friendly_morale: i32,
}

impl GameContext {
    pub fn from_state(state: &RunState) -> Self {
        use crate::model::roster::Personality;

        let skip = state.history.len().saturating_sub(RECENT_HISTORY);
        Self {
            clock: state.clock,
            stats: state.stats,
            style: state.style,
            lifestyle: state.lifestyle,
            recent_history: state.history[skip..].to_vec(),
            principled_morale: state
                .roster
                .morale_by_personality(Personality::Principled)
                .unwrap_or_default(),
            local_friendly_morale: state
                .roster
                .morale_by_personality(Personality::LocalFriendly)
                .unwrap_or_default(),
        }
    }
}
