use rand::Rng;

use crate::engine::classify::{classify_archetype, ArchetypeInput};
use crate::engine::error::EngineError;
use crate::engine::events::after_time_advance;
use crate::engine::termination::{check_immediate, horizon_ending};
use crate::model::event_result::ChoiceReport;
use crate::model::llm_decode::ActionOutcome;
use crate::model::outcome::Ending;
use crate::model::roster::RosterDelta;
use crate::model::run_state::{GameMode, HistoryEntry, PendingDelayedEffect, RunState};
use crate::model::scenario::{Choice, ChoiceResult, GENERATED_NODE};

/// Resolve an authored choice on the node currently shown.
pub fn resolve_choice<R: Rng + ?Sized>(
    state: &mut RunState,
    node_id: &str,
    choice: &Choice,
    rng: &mut R,
) -> Result<ChoiceReport, EngineError> {
    resolve(state, node_id, &choice.text, &choice.result, false, rng)
}

/// Resolve a free-form action the generator accepted. It always consumes a
/// period and hands the next node back to the generator.
pub fn resolve_action<R: Rng + ?Sized>(
    state: &mut RunState,
    action: &str,
    outcome: &ActionOutcome,
    rng: &mut R,
) -> Result<ChoiceReport, EngineError> {
    let result = ChoiceResult {
        message: Some(outcome.message.clone()).filter(|m| !m.is_empty()),
        stats: outcome.stats.clone(),
        advance_time: true,
        next: Some(GENERATED_NODE.to_string()),
        ..ChoiceResult::default()
    };
    let node_id = state.current_node.clone();
    resolve(state, &node_id, action, &result, true, rng)
}

fn next_target(state: &RunState, node_id: &str, result: &ChoiceResult) -> Result<String, EngineError> {
    if let Some(next) = &result.next {
        return Ok(next.clone());
    }
    if let Some(back) = &state.return_node {
        return Ok(back.clone());
    }
    match state.mode {
        GameMode::Generative => Ok(GENERATED_NODE.to_string()),
        GameMode::Static => Err(EngineError::NoNextNode(node_id.to_string())),
    }
}

fn finish(state: &mut RunState, report: &mut ChoiceReport, ending: Ending) {
    state.finish(ending);
    report.ending = Some(ending);
    report.next = state.current_node.clone();
    tracing::info!(ending = %ending, clock = %state.clock, "run ended");
}

fn resolve<R: Rng + ?Sized>(
    state: &mut RunState,
    node_id: &str,
    text: &str,
    result: &ChoiceResult,
    custom: bool,
    rng: &mut R,
) -> Result<ChoiceReport, EngineError> {
    if state.ended {
        return Err(EngineError::RunEnded);
    }
    // Decided before anything mutates so an authoring error leaves no trace.
    let next = next_target(state, node_id, result)?;
    let in_side_event = state.in_side_event();

    let before = state.stats;
    let mut report = ChoiceReport::new(node_id, text, before);
    report.message = result.message.clone();
    report.deltas = result.stats.clone();

    state.stats.apply(&result.stats);
    report.after = state.stats;
    state.history.push(HistoryEntry {
        node_id: node_id.to_string(),
        choice_text: text.to_string(),
        deltas: result.stats.clone(),
        before,
        after: state.stats,
        clock: state.clock,
        custom,
    });

    for RosterDelta { group, selector, delta } in result.deputy_morale.iter().copied() {
        report
            .morale_changes
            .extend(state.roster.apply_delta(group, selector, delta));
    }

    let now = state.clock.absolute_period();
    for (i, spec) in result.delayed_effects.iter().enumerate() {
        let id = spec
            .id
            .clone()
            .unwrap_or_else(|| format!("{node_id}#{i}"));
        state.pending_delayed_effects.push(PendingDelayedEffect {
            id: id.clone(),
            trigger_period: now + spec.trigger_period,
            condition: spec.condition.clone(),
            stats: spec.stats.clone(),
            message: spec.message.clone(),
        });
        report.scheduled_effects.push(id);
    }

    state.style.record(&result.stats);

    tracing::debug!(
        node = node_id,
        choice = text,
        custom,
        morale_changes = report.morale_changes.len(),
        scheduled = report.scheduled_effects.len(),
        "choice applied"
    );

    if let Some(ending) = check_immediate(&state.stats) {
        finish(state, &mut report, ending);
        return Ok(report);
    }

    let mut side_event = None;
    if result.advance_time {
        state.clock.advance();
        report.advanced_time = true;

        if state.clock.is_past_horizon() {
            let ending = horizon_ending(&state.stats, &state.roster);
            state.archetype = Some(classify_archetype(&ArchetypeInput::from_state(state), rng));
            finish(state, &mut report, ending);
            return Ok(report);
        }

        if !in_side_event {
            let outcome = after_time_advance(state, rng);
            report.fired_effects = outcome.fired_effects;
            if let Some(ending) = outcome.ending {
                finish(state, &mut report, ending);
                return Ok(report);
            }
            side_event = outcome.side_event;
        }
    }

    match side_event {
        Some(event) => {
            state.return_node = Some(next);
            state.current_node = event.id.clone();
            report.side_event = Some(event);
        }
        None => {
            state.return_node = None;
            state.current_node = next;
        }
    }
    report.next = state.current_node.clone();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::roster::Personality;
    use crate::model::scenario::{Condition, DelayedEffectSpec};
    use crate::model::stats::{Stat, StatDeltas};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn choice(stats: StatDeltas, advance_time: bool, next: Option<&str>) -> Choice {
        Choice {
            text: "pick".into(),
            subtext: None,
            trade_off: None,
            result: ChoiceResult {
                stats,
                advance_time,
                next: next.map(str::to_string),
                ..ChoiceResult::default()
            },
        }
    }

    #[test]
    fn staff_revolt_ends_the_run_immediately() {
        let mut state = RunState::new(GameMode::Static);
        state.stats.staff_morale = 5;
        let mut rng = StdRng::seed_from_u64(0);
        let c = choice(StatDeltas::new().with(Stat::StaffMorale, -10), true, Some("period_2"));

        let report = resolve_choice(&mut state, "start", &c, &mut rng).unwrap();
        assert!(state.ended);
        assert_eq!(state.ending, Some(Ending::StaffRevolt));
        assert_eq!(state.stats.staff_morale, 0);
        assert_eq!(report.ending, Some(Ending::StaffRevolt));
        assert!(!report.advanced_time);
        assert_eq!(state.current_node, "ending_staff_revolt");

        let again = resolve_choice(&mut state, "ending_staff_revolt", &c, &mut rng);
        assert!(matches!(again, Err(EngineError::RunEnded)));
    }

    #[test]
    fn missing_next_in_static_mode_is_an_error_without_mutation() {
        let mut state = RunState::new(GameMode::Static);
        let mut rng = StdRng::seed_from_u64(0);
        let c = choice(StatDeltas::new().with(Stat::Reputation, 10), false, None);
        let err = resolve_choice(&mut state, "start", &c, &mut rng).unwrap_err();
        assert!(matches!(err, EngineError::NoNextNode(_)));
        assert_eq!(state.stats.reputation, 40);
        assert!(state.history.is_empty());
    }

    #[test]
    fn missing_next_in_generative_mode_asks_generator() {
        let mut state = RunState::new(GameMode::Generative);
        let mut rng = StdRng::seed_from_u64(0);
        let c = choice(StatDeltas::new(), false, None);
        let report = resolve_choice(&mut state, "start", &c, &mut rng).unwrap();
        assert_eq!(report.next, GENERATED_NODE);
    }

    #[test]
    fn delayed_effect_registers_absolute_period() {
        let mut state = RunState::new(GameMode::Static);
        state.clock.advance();
        state.clock.advance();
        let mut rng = StdRng::seed_from_u64(0);
        let mut c = choice(StatDeltas::new(), false, Some("period_3"));
        c.result.delayed_effects.push(DelayedEffectSpec {
            id: Some("ngo_network".into()),
            trigger_period: 4,
            condition: Condition::Always,
            message: "The NGO network pays off.".into(),
            stats: StatDeltas::new().with(Stat::Reputation, 5),
        });
        c.result.delayed_effects.push(DelayedEffectSpec {
            id: None,
            trigger_period: 1,
            condition: Condition::Always,
            message: String::new(),
            stats: StatDeltas::new(),
        });

        let report = resolve_choice(&mut state, "period_3", &c, &mut rng).unwrap();
        assert_eq!(report.scheduled_effects, vec!["ngo_network", "period_3#1"]);
        assert_eq!(state.pending_delayed_effects[0].trigger_period, 7);
        assert_eq!(state.pending_delayed_effects[1].trigger_period, 4);
    }

    #[test]
    fn roster_changes_are_reported() {
        let mut state = RunState::new(GameMode::Static);
        let mut rng = StdRng::seed_from_u64(0);
        let mut c = choice(StatDeltas::new(), false, Some("period_2"));
        c.result.deputy_morale =
            serde_json::from_str(r#"{"principled": 10, "coordinators": -5}"#).unwrap();
        let report = resolve_choice(&mut state, "start", &c, &mut rng).unwrap();
        assert_eq!(report.morale_changes.len(), 3);
        assert_eq!(state.roster.morale_by_personality(Personality::Principled), Some(45));
    }

    #[test]
    fn last_period_reaches_horizon_with_archetype() {
        let mut state = RunState::new(GameMode::Static);
        for _ in 0..11 {
            state.clock.advance();
        }
        let mut rng = StdRng::seed_from_u64(0);
        let c = choice(StatDeltas::new(), true, Some("ending_average"));
        let report = resolve_choice(&mut state, "period_12", &c, &mut rng).unwrap();
        assert!(state.ended);
        assert!(state.archetype.is_some());
        assert_eq!(report.ending, state.ending);
        assert!(!report.ending.map_or(true, Ending::is_failure));
    }

    #[test]
    fn side_event_choice_returns_to_main_line_without_events() {
        let mut state = RunState::new(GameMode::Static);
        state.current_node = "life_event_illness".into();
        state.return_node = Some("period_4".into());
        let mut rng = StdRng::seed_from_u64(0);
        let c = choice(StatDeltas::new().with(Stat::Wellbeing, 5), false, None);
        let report = resolve_choice(&mut state, "life_event_illness", &c, &mut rng).unwrap();
        assert_eq!(report.next, "period_4");
        assert!(state.return_node.is_none());
        assert!(report.side_event.is_none());
    }

    #[test]
    fn accepted_action_is_custom_history() {
        let mut state = RunState::new(GameMode::Generative);
        state.current_node = GENERATED_NODE.into();
        let mut rng = StdRng::seed_from_u64(0);
        let outcome = ActionOutcome {
            success: true,
            message: "The minister agrees to meet.".into(),
            stats: StatDeltas::new().with(Stat::Reputation, 12),
        };
        let report = resolve_action(&mut state, "Call the minister", &outcome, &mut rng).unwrap();
        assert!(report.advanced_time);
        assert!(state.history[0].custom);
        assert_eq!(state.style.reputation, 2);
        assert_eq!(state.clock.absolute_period(), 2);
    }
}
