use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::engine::apply_choice::{resolve_action, resolve_choice};
use crate::engine::classify::{classify_archetype, ArchetypeInput, Debrief};
use crate::engine::error::EngineError;
use crate::engine::graph::{NodeOrigin, ScenarioGraph};
use crate::engine::termination::{composite_score, horizon_ending, is_risky, would_terminate};
use crate::model::event_result::{ChoiceReport, EffectResult, SideEventKind};
use crate::model::game_context::GameContext;
use crate::model::game_save::GameSave;
use crate::model::lifestyle::{LifestyleChoice, LifestyleSlot};
use crate::model::llm_decode::decode_action_outcome;
use crate::model::message::{Message, NarrationKind};
use crate::model::outcome::{Archetype, Ending};
use crate::model::run_state::{GameMode, RunState};
use crate::model::scenario::{ScenarioNode, START_NODE};
use crate::model::stats::{Stats, StatDeltas};

/// Pre-commit warning for one option on the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceWarning {
    pub would_end: Option<Ending>,
    pub risky: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub ending: Ending,
    pub score: f64,
    pub stats: Stats,
    pub archetype: Option<Archetype>,
    pub debrief: Option<Debrief>,
}

/// Snapshot the UI renders from.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub state: RunState,
    pub started: bool,
    pub pending_lifestyle: Vec<LifestyleSlot>,
    pub node_id: String,
    pub node: Option<ScenarioNode>,
    pub warnings: Vec<ChoiceWarning>,
    pub journal: Vec<Message>,
    pub last_report: Option<ChoiceReport>,
    pub final_report: Option<FinalReport>,
    pub halted: Option<String>,
    pub free_form_enabled: bool,
}

/// One playthrough: the run state, the node on screen and its journal.
pub struct Session {
    graph: ScenarioGraph,
    state: RunState,
    current: Option<ScenarioNode>,
    journal: Vec<Message>,
    last_report: Option<ChoiceReport>,
    rng: StdRng,
    started: bool,
    halted: Option<String>,
}

impl Session {
    pub fn new(graph: ScenarioGraph, mode: GameMode, seed: Option<u64>) -> Self {
        let rng = seed.map(StdRng::seed_from_u64).unwrap_or_else(StdRng::from_entropy);
        Self {
            graph,
            state: RunState::new(mode),
            current: None,
            journal: vec![Message::System(
                "Choose your transport, housing, leisure and diet before the term begins.".into(),
            )],
            last_report: None,
            rng,
            started: false,
            halted: None,
        }
    }

    /// Resume a saved run. A saved generated node is generated afresh.
    pub fn from_save(graph: ScenarioGraph, save: GameSave, seed: Option<u64>) -> Result<Self, EngineError> {
        let mut session = Self::new(graph, save.mode, seed);
        session.state = save.state;
        session.journal = save.messages;
        session.started = session.state.lifestyle.is_complete();
        if session.started {
            let id = session.state.current_node.clone();
            session.enter(&id, false)?;
        }
        Ok(session)
    }

    pub fn to_save(&self) -> GameSave {
        GameSave::new(self.state.clone(), self.journal.clone())
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn current_node(&self) -> Option<&ScenarioNode> {
        self.current.as_ref()
    }

    pub fn journal(&self) -> &[Message] {
        &self.journal
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn choose_lifestyle(&mut self, choice: LifestyleChoice) -> Result<StatDeltas, EngineError> {
        if self.started {
            return Err(EngineError::AlreadyStarted);
        }
        self.state
            .lifestyle
            .record(choice)
            .map_err(|existing| EngineError::LifestyleAlreadyChosen(existing.slot()))?;
        let deltas = choice.deltas();
        self.state.stats.apply(&deltas);
        self.journal.push(Message::Director(format!(
            "{}: {}",
            choice.slot().label(),
            choice.label()
        )));
        Ok(deltas)
    }

    pub fn begin(&mut self) -> Result<(), EngineError> {
        if self.started {
            return Err(EngineError::AlreadyStarted);
        }
        if let Some(slot) = self.state.lifestyle.missing().first() {
            return Err(EngineError::LifestyleIncomplete(*slot));
        }
        self.started = true;
        tracing::info!(mode = ?self.state.mode, "term started");
        self.enter(START_NODE, true)
    }

    pub fn restart(&mut self) {
        let mode = self.state.mode;
        self.state = RunState::new(mode);
        self.current = None;
        self.last_report = None;
        self.started = false;
        self.halted = None;
        self.journal = vec![Message::System("A new term begins.".into())];
    }

    /// Puts `id` on screen. A node without choices ends the run.
    fn enter(&mut self, id: &str, narrate: bool) -> Result<(), EngineError> {
        if let Some(ending) = self.state.ending.filter(|_| self.state.ended) {
            let content = self.graph.content();
            let node = content
                .get(id)
                .filter(|n| n.is_terminal())
                .or_else(|| content.get(&ending.node_id()))
                .cloned()
                .unwrap_or_else(|| {
                    tracing::warn!(ending = %ending, "ending node missing from content");
                    ScenarioNode {
                        title: ending.id().replace('_', " "),
                        description: String::new(),
                        choices: Vec::new(),
                    }
                });
            if narrate {
                self.journal.push(Message::narration(
                    NarrationKind::Ending,
                    format!("{}\n\n{}", node.title, node.description),
                ));
            }
            self.current = Some(node);
            return Ok(());
        }

        match self.graph.node(id, &mut self.state, &mut self.rng) {
            Ok(resolved) => {
                if resolved.origin == NodeOrigin::Fallback {
                    self.journal.push(Message::System(
                        "The generator did not answer; an authored scenario was used instead.".into(),
                    ));
                }
                self.state.current_node = resolved.id.clone();
                self.state.mark_visited(&resolved.id);
                let kind = if resolved.node.is_terminal() {
                    self.end_on(&resolved.id);
                    NarrationKind::Ending
                } else {
                    NarrationKind::Scenario
                };
                if narrate {
                    self.journal.push(Message::narration(
                        kind,
                        format!("{}\n\n{}", resolved.node.title, resolved.node.description),
                    ));
                }
                self.current = Some(resolved.node);
                Ok(())
            }
            Err(err) => {
                tracing::error!(id, error = %err, "cannot continue run");
                self.halted = Some(err.to_string());
                self.current = None;
                self.journal.push(Message::System(format!("Scenario not found: {id}")));
                Err(err)
            }
        }
    }

    /// Ends the run on a terminal node reached through `next`. Unknown
    /// terminal ids are scored like the end of the term.
    fn end_on(&mut self, id: &str) {
        let ending = Ending::from_node_id(id)
            .unwrap_or_else(|| horizon_ending(&self.state.stats, &self.state.roster));
        if !ending.is_failure() {
            let input = ArchetypeInput::from_state(&self.state);
            self.state.archetype = Some(classify_archetype(&input, &mut self.rng));
        }
        self.state.finish(ending);
        self.state.current_node = id.to_string();
        tracing::info!(node = id, ending = %ending, "run ended on a terminal node");
    }

    fn ensure_playable(&self) -> Result<(), EngineError> {
        if !self.started {
            return Err(EngineError::NotStarted);
        }
        if self.state.ended {
            return Err(EngineError::RunEnded);
        }
        Ok(())
    }

    pub fn choose(&mut self, index: usize) -> Result<ChoiceReport, EngineError> {
        self.ensure_playable()?;
        let node_id = self.state.current_node.clone();
        let node = self
            .current
            .as_ref()
            .ok_or_else(|| EngineError::ScenarioNotFound(node_id.clone()))?;
        let choice = node
            .choices
            .get(index)
            .cloned()
            .ok_or(EngineError::InvalidChoice {
                node: node_id.clone(),
                index,
                available: node.choices.len(),
            })?;

        let mut report = resolve_choice(&mut self.state, &node_id, &choice, &mut self.rng)?;
        self.journal.push(Message::Director(choice.text.clone()));
        self.record(&report);
        self.enter(&report.next, true)?;
        self.note_ending(&mut report);
        Ok(report)
    }

    /// Free-form text routed through the generator.
    pub fn free_action(&mut self, action: &str) -> Result<ChoiceReport, EngineError> {
        self.ensure_playable()?;
        if self.state.mode != GameMode::Generative {
            return Err(EngineError::GenerativeUnavailable);
        }
        let generator = self.graph.generator().ok_or(EngineError::GenerativeUnavailable)?;
        if self.state.in_side_event() {
            return Err(EngineError::ActionRejected("deal with the current event first".into()));
        }
        let action = action.trim();
        if action.is_empty() {
            return Err(EngineError::ActionRejected("nothing to do".into()));
        }

        let context = GameContext::from_state(&self.state);
        let outcome = generator
            .interpret_action(&context, action)
            .and_then(|raw| decode_action_outcome(&raw).map_err(anyhow::Error::from))
            .map_err(|err| {
                tracing::warn!(error = %err, "free-form action could not be interpreted");
                EngineError::ActionRejected(err.to_string())
            })?;
        if !outcome.success {
            self.journal.push(Message::Director(action.to_string()));
            self.journal.push(Message::System(outcome.message.clone()));
            return Err(EngineError::ActionRejected(outcome.message));
        }

        let mut report = resolve_action(&mut self.state, action, &outcome, &mut self.rng)?;
        self.journal.push(Message::Director(action.to_string()));
        self.record(&report);
        self.enter(&report.next, true)?;
        self.note_ending(&mut report);
        Ok(report)
    }

    fn record(&mut self, report: &ChoiceReport) {
        if let Some(message) = &report.message {
            self.journal.push(Message::narration(NarrationKind::Outcome, message.clone()));
        }
        for change in &report.morale_changes {
            self.journal.push(Message::System(format!(
                "{} morale {} -> {}",
                change.name, change.before, change.after
            )));
        }
        for effect in &report.fired_effects {
            if effect.result == EffectResult::Applied && !effect.message.is_empty() {
                self.journal.push(Message::narration(
                    NarrationKind::DelayedEffect,
                    effect.message.clone(),
                ));
            }
        }
        if let Some(event) = &report.side_event {
            let text = match event.kind {
                SideEventKind::Life => "Something comes up in your private life.",
                SideEventKind::Roster => "Something is brewing in the office.",
            };
            self.journal.push(Message::narration(NarrationKind::SideEvent, text));
        }
        self.last_report = Some(report.clone());
    }

    fn note_ending(&mut self, report: &mut ChoiceReport) {
        if report.ending.is_none() && self.state.ended {
            report.ending = self.state.ending;
            if let Some(last) = self.last_report.as_mut() {
                last.ending = report.ending;
            }
        }
    }

    pub fn warnings(&self) -> Vec<ChoiceWarning> {
        self.current
            .iter()
            .flat_map(|node| node.choices.iter())
            .map(|c| ChoiceWarning {
                would_end: would_terminate(&self.state.stats, &c.result.stats),
                risky: is_risky(&c.result.stats),
            })
            .collect()
    }

    pub fn final_report(&self) -> Option<FinalReport> {
        let ending = self.state.ending.filter(|_| self.state.ended)?;
        let debrief = self
            .state
            .archetype
            .map(|a| Debrief::new(&ArchetypeInput::from_state(&self.state), a));
        Some(FinalReport {
            ending,
            score: composite_score(&self.state.stats),
            stats: self.state.stats,
            archetype: self.state.archetype,
            debrief,
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            state: self.state.clone(),
            started: self.started,
            pending_lifestyle: self.state.lifestyle.missing(),
            node_id: self.state.current_node.clone(),
            node: self.current.clone(),
            warnings: self.warnings(),
            journal: self.journal.clone(),
            last_report: self.last_report.clone(),
            final_report: self.final_report(),
            halted: self.halted.clone(),
            free_form_enabled: self.state.mode == GameMode::Generative && self.graph.has_generator(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lifestyle::{Diet, Housing, Leisure, Transport};
    use crate::model::scenario::ScenarioContent;

    fn setup(session: &mut Session) {
        for choice in [
            LifestyleChoice::Transport(Transport::BringFromKorea),
            LifestyleChoice::Housing(Housing::Secure),
            LifestyleChoice::Leisure(Leisure::Reading),
            LifestyleChoice::Diet(Diet::Mixed),
        ] {
            session.choose_lifestyle(choice).unwrap();
        }
    }

    fn session() -> Session {
        let graph = ScenarioGraph::new(ScenarioContent::embedded().unwrap());
        Session::new(graph, GameMode::Static, Some(17))
    }

    #[test]
    fn begin_requires_full_lifestyle() {
        let mut s = session();
        s.choose_lifestyle(LifestyleChoice::Diet(Diet::EatOut)).unwrap();
        assert!(matches!(s.begin(), Err(EngineError::LifestyleIncomplete(LifestyleSlot::Transport))));
        assert!(matches!(
            s.choose_lifestyle(LifestyleChoice::Diet(Diet::Mixed)),
            Err(EngineError::LifestyleAlreadyChosen(LifestyleSlot::Diet))
        ));
        assert!(matches!(s.choose(0), Err(EngineError::NotStarted)));
    }

    #[test]
    fn lifestyle_deltas_hit_stats_once() {
        let mut s = session();
        setup(&mut s);
        // stress 25 -5 -5 -8 = 7, wellbeing 65 +5 +3 +5 +5 = 83
        assert_eq!(s.state().stats.stress, 7);
        assert_eq!(s.state().stats.wellbeing, 83);
        s.begin().unwrap();
        assert!(matches!(s.begin(), Err(EngineError::AlreadyStarted)));
        assert!(matches!(
            s.choose_lifestyle(LifestyleChoice::Diet(Diet::Mixed)),
            Err(EngineError::AlreadyStarted)
        ));
    }

    #[test]
    fn invalid_index_leaves_state_alone() {
        let mut s = session();
        setup(&mut s);
        s.begin().unwrap();
        let before = s.state().clone();
        let err = s.choose(99).unwrap_err();
        assert!(matches!(err, EngineError::InvalidChoice { index: 99, .. }));
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn view_exposes_warnings_per_choice() {
        let mut s = session();
        setup(&mut s);
        s.begin().unwrap();
        let view = s.view();
        assert_eq!(view.node_id, START_NODE);
        assert_eq!(view.warnings.len(), view.node.as_ref().map_or(0, |n| n.choices.len()));
        assert!(!view.free_form_enabled);
    }

    #[test]
    fn free_form_needs_generative_mode() {
        let mut s = session();
        setup(&mut s);
        s.begin().unwrap();
        assert!(matches!(s.free_action("fire everyone"), Err(EngineError::GenerativeUnavailable)));
    }

    #[test]
    fn save_and_resume_keeps_position() {
        let mut s = session();
        setup(&mut s);
        s.begin().unwrap();
        s.choose(0).unwrap();
        let save = s.to_save();
        let graph = ScenarioGraph::new(ScenarioContent::embedded().unwrap());
        let resumed = Session::from_save(graph, save, Some(1)).unwrap();
        assert_eq!(resumed.state(), s.state());
        assert_eq!(resumed.current_node().map(|n| &n.title), s.current_node().map(|n| &n.title));
        assert_eq!(resumed.journal(), s.journal());
    }
}
