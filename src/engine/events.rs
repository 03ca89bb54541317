use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::engine::termination::check_immediate;
use crate::model::event_result::{EffectResult, FiredEffect, SideEvent, SideEventKind};
use crate::model::lifestyle::{Diet, Housing, Leisure, Transport};
use crate::model::outcome::Ending;
use crate::model::roster::Personality;
use crate::model::run_state::RunState;

/// Side events allowed over a whole term.
pub const MAX_SIDE_EVENTS: u32 = 4;

const MIN_LIFE_CHANCE: f64 = 0.15;
const MAX_LIFE_CHANCE: f64 = 0.60;
const PRESSURE_BONUS: f64 = 0.10;

pub struct LifeEvent {
    pub id: &'static str,
    pub weight: u32,
    pub one_time: bool,
    pub eligible: fn(&RunState) -> bool,
}

pub const LIFE_EVENTS: &[LifeEvent] = &[
    LifeEvent {
        id: "life_event_car_breakdown",
        weight: 3,
        one_time: true,
        eligible: |s| s.lifestyle.transport == Some(Transport::BuyLocal),
    },
    LifeEvent {
        id: "life_event_taxi_scam",
        weight: 3,
        one_time: true,
        eligible: |s| s.lifestyle.transport == Some(Transport::NoCar),
    },
    LifeEvent {
        id: "life_event_burglary",
        weight: 2,
        one_time: true,
        eligible: |s| {
            s.lifestyle.housing.is_some() && s.lifestyle.housing != Some(Housing::Secure)
        },
    },
    LifeEvent {
        id: "life_event_food_poisoning",
        weight: 3,
        one_time: true,
        eligible: |s| s.lifestyle.diet == Some(Diet::EatOut),
    },
    LifeEvent {
        id: "life_event_sports_injury",
        weight: 2,
        one_time: true,
        eligible: |s| s.lifestyle.leisure == Some(Leisure::Exercise),
    },
    LifeEvent {
        id: "life_event_hangover_meeting",
        weight: 3,
        one_time: true,
        eligible: |s| s.lifestyle.leisure == Some(Leisure::Drinking),
    },
    LifeEvent {
        id: "life_event_insomnia",
        weight: 4,
        one_time: true,
        eligible: |s| s.stats.stress > 60,
    },
    LifeEvent {
        id: "life_event_illness",
        weight: 4,
        one_time: true,
        eligible: |s| s.stats.wellbeing < 40,
    },
    LifeEvent {
        id: "life_event_family_visit",
        weight: 2,
        one_time: true,
        eligible: |s| s.clock.year == 1 && s.stats.wellbeing < 70,
    },
    LifeEvent {
        id: "life_event_homesick",
        weight: 2,
        one_time: true,
        eligible: |s| s.clock.year == 2,
    },
    LifeEvent {
        id: "life_event_power_outage",
        weight: 1,
        one_time: false,
        eligible: |_| true,
    },
];

pub struct RosterEvent {
    pub id: &'static str,
    pub check: fn(&RunState) -> bool,
}

fn deputy_morale(state: &RunState, personality: Personality) -> i32 {
    state.roster.morale_by_personality(personality).unwrap_or_default()
}

/// Evaluated top to bottom; the first unfired match wins.
pub const ROSTER_EVENTS: &[RosterEvent] = &[
    RosterEvent {
        id: "deputy_principled_low_resignation",
        check: |s| deputy_morale(s, Personality::Principled) <= 20,
    },
    RosterEvent {
        id: "deputy_local_friendly_cultural_crisis",
        check: |s| deputy_morale(s, Personality::LocalFriendly) <= 20,
    },
    RosterEvent {
        id: "deputy_principled_high_loyalty",
        check: |s| deputy_morale(s, Personality::Principled) >= 50,
    },
    RosterEvent {
        id: "deputy_local_friendly_network_bonus",
        check: |s| deputy_morale(s, Personality::LocalFriendly) >= 50,
    },
    RosterEvent {
        id: "office_hq_recognition",
        check: |s| s.stats.reputation >= 75,
    },
    RosterEvent {
        id: "office_project_crisis",
        check: |s| s.stats.project_success <= 20,
    },
];

pub fn side_event_ids() -> impl Iterator<Item = &'static str> {
    LIFE_EVENTS
        .iter()
        .map(|e| e.id)
        .chain(ROSTER_EVENTS.iter().map(|e| e.id))
}

pub fn is_side_event(id: &str) -> bool {
    side_event_ids().any(|s| s == id)
}

/// Nodes the engine may jump to without content pointing at them.
pub fn required_node_ids() -> Vec<String> {
    let mut ids: Vec<String> = side_event_ids().map(str::to_string).collect();
    ids.extend(Ending::ALL.iter().map(|e| e.node_id()));
    ids
}

#[derive(Debug, Default)]
pub struct EventOutcome {
    pub fired_effects: Vec<FiredEffect>,
    pub side_event: Option<SideEvent>,
    pub ending: Option<Ending>,
}

/// Evaluates every pending effect whose trigger period has arrived. Each one
/// gets a single evaluation and is dropped whatever the result.
pub fn activate_delayed<R: Rng + ?Sized>(
    state: &mut RunState,
    rng: &mut R,
) -> (Vec<FiredEffect>, Option<Ending>) {
    let now = state.clock.absolute_period();
    let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut state.pending_delayed_effects)
        .into_iter()
        .partition(|e| e.trigger_period <= now);
    state.pending_delayed_effects = waiting;

    let mut fired = Vec::new();
    for effect in due {
        let result = if effect.condition.evaluate(&state.stats, rng) {
            state.stats.apply(&effect.stats);
            EffectResult::Applied
        } else {
            EffectResult::Rejected {
                reason: format!("condition '{}' not met", effect.condition),
            }
        };
        tracing::debug!(id = %effect.id, period = now, ?result, "delayed effect evaluated");
        fired.push(FiredEffect {
            id: effect.id,
            message: effect.message,
            deltas: effect.stats,
            result,
        });
        if let Some(ending) = check_immediate(&state.stats) {
            return (fired, Some(ending));
        }
    }
    (fired, None)
}

pub fn life_event_chance(state: &RunState) -> f64 {
    let slots = MAX_SIDE_EVENTS.saturating_sub(state.side_event_count) as f64;
    let periods = state.clock.remaining_periods() as f64;
    let mut chance = (slots / periods).clamp(MIN_LIFE_CHANCE, MAX_LIFE_CHANCE);
    if state.stats.stress > 70 {
        chance += PRESSURE_BONUS;
    }
    if state.stats.wellbeing < 30 {
        chance += PRESSURE_BONUS;
    }
    chance
}

pub fn life_candidates(state: &RunState) -> Vec<&'static LifeEvent> {
    LIFE_EVENTS
        .iter()
        .filter(|e| !(e.one_time && state.has_triggered(e.id)))
        .filter(|e| (e.eligible)(state))
        .collect()
}

pub fn draw_life_event<R: Rng + ?Sized>(state: &RunState, rng: &mut R) -> Option<&'static LifeEvent> {
    let candidates = life_candidates(state);
    if candidates.is_empty() {
        return None;
    }
    if rng.gen::<f64>() >= life_event_chance(state) {
        return None;
    }
    let weights = WeightedIndex::new(candidates.iter().map(|e| e.weight)).ok()?;
    Some(candidates[weights.sample(rng)])
}

pub fn check_roster_events(state: &RunState) -> Option<&'static RosterEvent> {
    ROSTER_EVENTS
        .iter()
        .find(|e| !state.has_triggered(e.id) && (e.check)(state))
}

fn record_side_event(state: &mut RunState, id: &str) {
    state.triggered_event_ids.push(id.to_string());
    state.side_event_count += 1;
}

/// Runs after the clock has moved: due delayed effects first, then at most
/// one side event while the cap allows.
pub fn after_time_advance<R: Rng + ?Sized>(state: &mut RunState, rng: &mut R) -> EventOutcome {
    let (fired_effects, ending) = activate_delayed(state, rng);
    let mut outcome = EventOutcome {
        fired_effects,
        side_event: None,
        ending,
    };
    if outcome.ending.is_some() || state.side_event_count >= MAX_SIDE_EVENTS {
        return outcome;
    }

    if let Some(event) = draw_life_event(state, rng) {
        record_side_event(state, event.id);
        tracing::info!(id = event.id, count = state.side_event_count, "life event fired");
        outcome.side_event = Some(SideEvent {
            id: event.id.to_string(),
            kind: SideEventKind::Life,
        });
    } else if let Some(event) = check_roster_events(state) {
        record_side_event(state, event.id);
        tracing::info!(id = event.id, count = state.side_event_count, "roster event fired");
        outcome.side_event = Some(SideEvent {
            id: event.id.to_string(),
            kind: SideEventKind::Roster,
        });
    }
    outcome
}
