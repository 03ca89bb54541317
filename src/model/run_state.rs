use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::lifestyle::Lifestyle;
use crate::model::outcome::{Archetype, Ending};
use crate::model::roster::Roster;
use crate::model::scenario::{Condition, START_NODE};
use crate::model::stats::{Focus, StatDeltas, Stats};

pub const PERIODS_PER_YEAR: u32 = 6;
pub const TERM_YEARS: u32 = 2;
pub const TOTAL_PERIODS: u32 = PERIODS_PER_YEAR * TERM_YEARS;

const PERIOD_LABELS: [&str; PERIODS_PER_YEAR as usize] =
    ["Jan-Feb", "Mar-Apr", "May-Jun", "Jul-Aug", "Sep-Oct", "Nov-Dec"];

/// Bimonthly clock over a two-year term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    pub year: u32,
    pub period: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self { year: 1, period: 1 }
    }
}

impl Clock {
    pub fn advance(&mut self) {
        self.period += 1;
        if self.period > PERIODS_PER_YEAR {
            self.period = 1;
            self.year += 1;
        }
    }

    /// 1-based index across the whole term; 13 once the term is over.
    pub fn absolute_period(&self) -> u32 {
        (self.year.saturating_sub(1)) * PERIODS_PER_YEAR + self.period
    }

    pub fn is_past_horizon(&self) -> bool {
        self.year > TERM_YEARS
    }

    /// Periods left including the current one, never below 1.
    pub fn remaining_periods(&self) -> u32 {
        (TOTAL_PERIODS + 1).saturating_sub(self.absolute_period()).max(1)
    }

    pub fn period_label(&self) -> &'static str {
        self.period
            .checked_sub(1)
            .and_then(|i| PERIOD_LABELS.get(i as usize))
            .copied()
            .unwrap_or("?")
    }
}

impl fmt::Display for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Year {}, {}", self.year, self.period_label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Static,
    Generative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub node_id: String,
    pub choice_text: String,
    pub deltas: StatDeltas,
    pub before: Stats,
    pub after: Stats,
    pub clock: Clock,
    /// Free-form action rather than an authored choice.
    #[serde(default)]
    pub custom: bool,
}

/// Per-focus weights accumulated over the run, plus the risk counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleCounters {
    pub reputation: u32,
    pub budget: u32,
    pub staff: u32,
    pub project: u32,
    pub risk_taking: u32,
}

impl StyleCounters {
    pub fn get(&self, focus: Focus) -> u32 {
        match focus {
            Focus::Reputation => self.reputation,
            Focus::Budget => self.budget,
            Focus::Staff => self.staff,
            Focus::Project => self.project,
        }
    }

    fn get_mut(&mut self, focus: Focus) -> &mut u32 {
        match focus {
            Focus::Reputation => &mut self.reputation,
            Focus::Budget => &mut self.budget,
            Focus::Staff => &mut self.staff,
            Focus::Project => &mut self.project,
        }
    }

    /// A large swing counts double when it is a gain and once when it is a
    /// sacrifice; small gains count once and small losses not at all.
    pub fn record(&mut self, deltas: &StatDeltas) {
        for (stat, delta) in deltas.iter() {
            let Some(focus) = stat.focus() else { continue };
            let weight = match delta {
                0 => 0,
                d if d.abs() >= 10 && d > 0 => 2,
                d if d.abs() >= 10 => 1,
                d if d > 0 => 1,
                _ => 0,
            };
            *self.get_mut(focus) += weight;
        }

        let total = deltas.total_magnitude();
        if total >= 30 {
            self.risk_taking += 2;
        } else if total >= 20 {
            self.risk_taking += 1;
        }
    }

    /// The single highest counter, if it is strictly ahead and non-zero.
    pub fn dominant(&self) -> Option<Focus> {
        let best = Focus::ALL.into_iter().map(|f| self.get(f)).max().unwrap_or(0);
        if best == 0 {
            return None;
        }
        let mut leaders = Focus::ALL.into_iter().filter(|f| self.get(*f) == best);
        match (leaders.next(), leaders.next()) {
            (Some(focus), None) => Some(focus),
            _ => None,
        }
    }

    /// Highest counter with ties going to the earlier focus; `None` if all are zero.
    pub fn top_concern(&self) -> Option<Focus> {
        let mut best: Option<Focus> = None;
        for focus in Focus::ALL {
            let value = self.get(focus);
            if value > 0 && best.map_or(true, |b| value > self.get(b)) {
                best = Some(focus);
            }
        }
        best
    }
}

/// A scheduled consequence waiting for its absolute trigger period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingDelayedEffect {
    pub id: String,
    pub trigger_period: u32,
    pub condition: Condition,
    pub stats: StatDeltas,
    pub message: String,
}

/// Everything one playthrough owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub mode: GameMode,
    pub stats: Stats,
    pub roster: Roster,
    pub clock: Clock,
    pub current_node: String,
    /// Main-line node to resume once the nested side event is done.
    pub return_node: Option<String>,
    pub visited: Vec<String>,
    pub history: Vec<HistoryEntry>,
    pub style: StyleCounters,
    pub lifestyle: Lifestyle,
    /// Side events in firing order.
    pub triggered_event_ids: Vec<String>,
    pub side_event_count: u32,
    pub pending_delayed_effects: Vec<PendingDelayedEffect>,
    pub ended: bool,
    pub ending: Option<Ending>,
    pub archetype: Option<Archetype>,
}

impl RunState {
    pub fn new(mode: GameMode) -> Self {
        Self {
            mode,
            stats: Stats::default(),
            roster: Roster::default(),
            clock: Clock::default(),
            current_node: START_NODE.to_string(),
            return_node: None,
            visited: Vec::new(),
            history: Vec::new(),
            style: StyleCounters::default(),
            lifestyle: Lifestyle::default(),
            triggered_event_ids: Vec::new(),
            side_event_count: 0,
            pending_delayed_effects: Vec::new(),
            ended: false,
            ending: None,
            archetype: None,
        }
    }

    pub fn in_side_event(&self) -> bool {
        self.return_node.is_some()
    }

    pub fn mark_visited(&mut self, id: &str) {
        if !self.visited.iter().any(|v| v == id) {
            self.visited.push(id.to_string());
        }
    }

    pub fn has_visited(&self, id: &str) -> bool {
        self.visited.iter().any(|v| v == id)
    }

    pub fn has_triggered(&self, id: &str) -> bool {
        self.triggered_event_ids.iter().any(|t| t == id)
    }

    pub fn total_choices(&self) -> u32 {
        self.history.len() as u32
    }

    /// Ends the run and points the graph at the ending node.
    pub fn finish(&mut self, ending: Ending) {
        self.ended = true;
        self.ending = Some(ending);
        self.return_node = None;
        self.current_node = ending.node_id();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::Stat;

    #[test]
    fn clock_wraps_into_second_year_and_past_horizon() {
        let mut clock = Clock::default();
        for _ in 0..5 {
            clock.advance();
        }
        assert_eq!((clock.year, clock.period), (1, 6));
        assert_eq!(clock.period_label(), "Nov-Dec");
        clock.advance();
        assert_eq!((clock.year, clock.period), (2, 1));
        assert_eq!(clock.absolute_period(), 7);
        for _ in 0..6 {
            clock.advance();
        }
        assert!(clock.is_past_horizon());
        assert_eq!(clock.absolute_period(), 13);
        assert_eq!(clock.remaining_periods(), 1);
    }

    #[test]
    fn style_weights_by_magnitude() {
        let mut style = StyleCounters::default();
        style.record(
            &StatDeltas::new()
                .with(Stat::Reputation, 12)
                .with(Stat::StaffMorale, -10)
                .with(Stat::ProjectSuccess, 4)
                .with(Stat::BudgetExecutionRate, -3),
        );
        assert_eq!(style.reputation, 2);
        assert_eq!(style.staff, 1);
        assert_eq!(style.project, 1);
        assert_eq!(style.budget, 0);
        // 12 + 10 + 4 + 3 = 29
        assert_eq!(style.risk_taking, 1);

        style.record(&StatDeltas::new().with(Stat::Stress, 20).with(Stat::Wellbeing, -10));
        assert_eq!(style.risk_taking, 3);
    }

    #[test]
    fn dominant_focus_needs_strict_lead() {
        let mut style = StyleCounters::default();
        assert_eq!(style.dominant(), None);
        style.staff = 3;
        style.project = 3;
        assert_eq!(style.dominant(), None);
        assert_eq!(style.top_concern(), Some(Focus::Staff));
        style.project = 4;
        assert_eq!(style.dominant(), Some(Focus::Project));
    }

    #[test]
    fn finish_clears_side_event_return() {
        let mut state = RunState::new(GameMode::Static);
        state.return_node = Some("period_3".into());
        state.finish(Ending::Burnout);
        assert!(state.ended);
        assert!(!state.in_side_event());
        assert_eq!(state.current_node, "ending_burnout");
    }
}
