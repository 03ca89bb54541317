use serde_json::{json, Map, Value};

use koica_sim::engine::error::EngineError;
use koica_sim::engine::events::required_node_ids;
use koica_sim::engine::graph::ScenarioGraph;
use koica_sim::engine::session::Session;
use koica_sim::engine::termination::horizon_ending;
use koica_sim::model::event_result::{ChoiceReport, EffectResult};
use koica_sim::model::lifestyle::{Diet, Housing, Leisure, LifestyleChoice, Transport};
use koica_sim::model::outcome::Ending;
use koica_sim::model::run_state::{GameMode, TOTAL_PERIODS};
use koica_sim::model::scenario::ScenarioContent;

/// A start node with the given result, then a single self-looping node that
/// only moves the clock. Side events and endings are neutral stubs.
fn content(start_result: Value) -> ScenarioContent {
    content_with(start_result, Map::new())
}

fn content_with(start_result: Value, extra: Map<String, Value>) -> ScenarioContent {
    let mut nodes = extra;
    nodes.insert(
        "start".into(),
        json!({"title": "Start", "description": "", "choices": [{"text": "go", "result": start_result}]}),
    );
    nodes.insert(
        "loop".into(),
        json!({"title": "Another period", "description": "", "choices": [
            {"text": "carry on", "result": {"advance_time": true, "next": "loop"}}
        ]}),
    );
    for id in required_node_ids() {
        let node = if id.starts_with("ending_") {
            json!({"title": id.as_str(), "description": ""})
        } else {
            json!({"title": id.as_str(), "description": "", "choices": [{"text": "ok", "result": {}}]})
        };
        nodes.insert(id, node);
    }
    ScenarioContent::from_json(&Value::Object(nodes).to_string()).unwrap()
}

/// Neutral picks: they only move stress and wellbeing.
fn started(content: ScenarioContent, seed: u64) -> Session {
    let mut session = Session::new(ScenarioGraph::new(content), GameMode::Static, Some(seed));
    for pick in [
        LifestyleChoice::Transport(Transport::BringFromKorea),
        LifestyleChoice::Housing(Housing::Secure),
        LifestyleChoice::Leisure(Leisure::Reading),
        LifestyleChoice::Diet(Diet::Mixed),
    ] {
        session.choose_lifestyle(pick).unwrap();
    }
    session.begin().unwrap();
    session
}

fn play_out(session: &mut Session) -> Vec<ChoiceReport> {
    let mut reports = Vec::new();
    for _ in 0..40 {
        if session.state().ended {
            break;
        }
        reports.push(session.choose(0).unwrap());
    }
    reports
}

#[test]
fn strong_term_is_legendary() {
    let start = json!({
        "stats": {"reputation": 50, "budget": 60, "staff_morale": 35, "project_success": 50},
        "advance_time": true,
        "next": "loop"
    });
    for seed in [1, 2, 3] {
        let mut session = started(content(start.clone()), seed);
        play_out(&mut session);

        let report = session.final_report().unwrap();
        assert!((report.score - 88.75).abs() < 1e-9);
        assert_eq!(report.ending, Ending::Legendary);
        assert!(report.archetype.is_some());
        assert_eq!(report.debrief.map(|d| d.paragraphs().len()), Some(4));
        assert_eq!(session.state().clock.absolute_period(), TOTAL_PERIODS + 1);
    }
}

#[test]
fn weak_budget_counts_half() {
    let start = json!({"stats": {"budget_execution_rate": 10}, "advance_time": true, "next": "loop"});
    let mut session = started(content(start), 9);
    play_out(&mut session);

    let report = session.final_report().unwrap();
    assert_eq!(report.stats.budget_execution_rate, 40);
    // (40 + 45 + 35 + 50) / 4
    assert!((report.score - 42.5).abs() < 1e-9);
    assert_eq!(report.ending, Ending::Struggling);
}

#[test]
fn delayed_effects_are_evaluated_exactly_once() {
    let start = json!({
        "advance_time": true,
        "next": "loop",
        "delayed_effects": [
            {"effect_id": "payoff", "trigger_period": 3, "condition": "always",
             "message": "It pays off.", "stats": {"reputation": 5}},
            {"effect_id": "long_shot", "trigger_period": 2, "condition": "project_success >= 99",
             "message": "Never.", "stats": {"reputation": 50}}
        ]
    });
    let mut session = started(content(start), 4);
    let reports = play_out(&mut session);

    let fired: Vec<(u32, &str, &EffectResult)> = reports
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.fired_effects.iter().map(move |e| (i as u32, e.id.as_str(), &e.result)))
        .collect();

    let payoff: Vec<_> = fired.iter().filter(|(_, id, _)| *id == "payoff").collect();
    assert_eq!(payoff.len(), 1);
    assert_eq!(*payoff[0].2, EffectResult::Applied);

    let long_shot: Vec<_> = fired.iter().filter(|(_, id, _)| *id == "long_shot").collect();
    assert_eq!(long_shot.len(), 1);
    assert!(matches!(long_shot[0].2, EffectResult::Rejected { .. }));

    assert!(session.state().pending_delayed_effects.is_empty());
    assert_eq!(session.state().stats.reputation, 45);
}

#[test]
fn staff_revolt_stops_the_term_at_once() {
    let start = json!({"stats": {"staff_morale": -60}, "advance_time": true, "next": "loop"});
    let mut session = started(content(start), 11);

    let report = session.choose(0).unwrap();
    assert_eq!(report.ending, Some(Ending::StaffRevolt));
    assert!(!report.advanced_time);

    let state = session.state();
    assert!(state.ended);
    assert_eq!(state.stats.staff_morale, 0);
    assert_eq!(state.clock.absolute_period(), 1);
    assert_eq!(state.current_node, "ending_staff_revolt");
    assert!(state.archetype.is_none());
}

#[test]
fn next_into_an_ending_node_ends_the_run() {
    let mut session = started(content(json!({"next": "ending_average"})), 5);

    let report = session.choose(0).unwrap();
    assert_eq!(report.ending, Some(Ending::Average));

    let state = session.state();
    assert!(state.ended);
    assert_eq!(state.current_node, "ending_average");
    assert!(state.archetype.is_some());

    let final_report = session.final_report().unwrap();
    assert_eq!(final_report.ending, Ending::Average);
    assert!(final_report.debrief.is_some());
    assert!(matches!(session.choose(0), Err(EngineError::RunEnded)));
}

#[test]
fn next_into_a_failure_ending_gets_no_archetype() {
    let mut session = started(content(json!({"next": "ending_burnout"})), 6);
    session.choose(0).unwrap();

    let state = session.state();
    assert!(state.ended);
    assert_eq!(state.ending, Some(Ending::Burnout));
    assert!(state.archetype.is_none());
}

#[test]
fn custom_terminal_node_is_scored_like_the_end_of_term() {
    let mut extra = Map::new();
    extra.insert(
        "farewell".into(),
        json!({"title": "Farewell dinner", "description": "The embassy sends you off early."}),
    );
    let mut session = started(content_with(json!({"next": "farewell"}), extra), 8);
    session.choose(0).unwrap();

    let state = session.state();
    assert!(state.ended);
    assert_eq!(state.current_node, "farewell");
    assert_eq!(state.ending, Some(horizon_ending(&state.stats, &state.roster)));
    assert!(state.archetype.is_some());
    assert_eq!(session.current_node().map(|n| n.title.as_str()), Some("Farewell dinner"));
}
