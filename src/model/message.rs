use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrationKind {
    Scenario,
    Outcome,
    DelayedEffect,
    SideEvent,
    Ending,
}

impl NarrationKind {
    pub fn key(self) -> &'static str {
        match self {
            NarrationKind::Scenario => "Scenario",
            NarrationKind::Outcome => "Outcome",
            NarrationKind::DelayedEffect => "DelayedEffect",
            NarrationKind::SideEvent => "SideEvent",
            NarrationKind::Ending => "Ending",
        }
    }
}

/// One line of the run journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Director(String),
    Narration {
        kind: NarrationKind,
        text: String,
    },
    System(String),
}

impl Message {
    pub fn narration(kind: NarrationKind, text: impl Into<String>) -> Self {
        Message::Narration {
            kind,
            text: text.into(),
        }
    }

    /// Key into the UI color table.
    pub fn color_key(&self) -> &'static str {
        match self {
            Message::Director(_) => "Director",
            Message::Narration { kind, .. } => kind.key(),
            Message::System(_) => "System",
        }
    }
}
