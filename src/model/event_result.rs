use serde::{Deserialize, Serialize};

use crate::model::outcome::Ending;
use crate::model::roster::MoraleChange;
use crate::model::stats::{StatDeltas, Stats};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectResult {
    Applied,
    Rejected { reason: String },
}

/// A delayed effect that reached its trigger period this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FiredEffect {
    pub id: String,
    pub message: String,
    pub deltas: StatDeltas,
    pub result: EffectResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideEventKind {
    Life,
    Roster,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideEvent {
    pub id: String,
    pub kind: SideEventKind,
}

/// Everything a resolved choice did, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceReport {
    pub node_id: String,
    pub choice_text: String,
    pub message: Option<String>,
    pub deltas: StatDeltas,
    pub before: Stats,
    pub after: Stats,
    pub morale_changes: Vec<MoraleChange>,
    pub scheduled_effects: Vec<String>,
    pub advanced_time: bool,
    pub fired_effects: Vec<FiredEffect>,
    pub side_event: Option<SideEvent>,
    pub ending: Option<Ending>,
    pub next: String,
}

impl ChoiceReport {
    pub fn new(node_id: &str, choice_text: &str, before: Stats) -> Self {
        Self {
            node_id: node_id.to_string(),
            choice_text: choice_text.to_string(),
            message: None,
            deltas: StatDeltas::new(),
            before,
            after: before,
            morale_changes: Vec::new(),
            scheduled_effects: Vec::new(),
            advanced_time: false,
            fired_effects: Vec::new(),
            side_event: None,
            ending: None,
            next: String::new(),
        }
    }
}
