use crate::model::outcome::Ending;
use crate::model::roster::{Personality, Roster};
use crate::model::stats::{Stat, StatDeltas, Stats};

pub const IDEAL_BUDGET_LOW: i32 = 80;

/// Failure endings, checked in this order so simultaneous failures are stable.
pub fn check_immediate(stats: &Stats) -> Option<Ending> {
    if stats.reputation <= 0 {
        Some(Ending::ReputationLoss)
    } else if stats.staff_morale <= 0 {
        Some(Ending::StaffRevolt)
    } else if stats.stress >= 100 {
        Some(Ending::Burnout)
    } else if stats.wellbeing <= 0 {
        Some(Ending::HealthCrisis)
    } else {
        None
    }
}

/// Applies `deltas` to a copy and reports the failure it would cause.
pub fn would_terminate(stats: &Stats, deltas: &StatDeltas) -> Option<Ending> {
    let mut preview = *stats;
    preview.apply(deltas);
    check_immediate(&preview)
}

pub fn is_risky(deltas: &StatDeltas) -> bool {
    deltas.get(Stat::Reputation) < -15
        || deltas.get(Stat::StaffMorale) < -15
        || deltas.get(Stat::Stress) > 15
        || deltas.get(Stat::Wellbeing) < -15
}

/// Full marks inside the 80..=100 band, linear shortfall below it.
pub fn budget_score(rate: i32) -> f64 {
    if (IDEAL_BUDGET_LOW..=100).contains(&rate) {
        100.0
    } else {
        rate as f64 / IDEAL_BUDGET_LOW as f64 * 100.0
    }
}

pub fn composite_score(stats: &Stats) -> f64 {
    (stats.reputation as f64
        + stats.staff_morale as f64
        + stats.project_success as f64
        + budget_score(stats.budget_execution_rate))
        / 4.0
}

pub fn tier_for_score(score: f64) -> Ending {
    if score >= 80.0 {
        Ending::Legendary
    } else if score >= 65.0 {
        Ending::Successful
    } else if score >= 50.0 {
        Ending::Average
    } else {
        Ending::Struggling
    }
}

/// Ending for a run that reached the end of the term.
pub fn horizon_ending(stats: &Stats, roster: &Roster) -> Ending {
    let tier = tier_for_score(composite_score(stats));
    let loyal = |p| roster.morale_by_personality(p).is_some_and(|m| m >= 60);
    if tier == Ending::Legendary
        && loyal(Personality::Principled)
        && loyal(Personality::LocalFriendly)
        && stats.stress <= 60
    {
        return Ending::PerfectBalance;
    }
    tier
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::roster::{MoraleSelector, RosterGroup};

    fn stats(rep: i32, budget: i32, staff: i32, project: i32) -> Stats {
        Stats {
            reputation: rep,
            budget_execution_rate: budget,
            staff_morale: staff,
            project_success: project,
            ..Stats::default()
        }
    }

    #[test]
    fn budget_band_and_shortfall() {
        assert_eq!(budget_score(40), 50.0);
        assert_eq!(budget_score(80), 100.0);
        assert_eq!(budget_score(100), 100.0);
        assert_eq!(budget_score(0), 0.0);
    }

    #[test]
    fn legendary_at_88_75() {
        let s = stats(90, 90, 80, 85);
        assert!((composite_score(&s) - 88.75).abs() < 1e-9);
        assert_eq!(horizon_ending(&s, &Roster::default()), Ending::Legendary);
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(tier_for_score(80.0), Ending::Legendary);
        assert_eq!(tier_for_score(79.99), Ending::Successful);
        assert_eq!(tier_for_score(65.0), Ending::Successful);
        assert_eq!(tier_for_score(50.0), Ending::Average);
        assert_eq!(tier_for_score(49.9), Ending::Struggling);
    }

    #[test]
    fn loyal_deputies_upgrade_legendary() {
        let s = stats(90, 90, 80, 85);
        let mut roster = Roster::default();
        roster.apply_delta(RosterGroup::Deputies, MoraleSelector::All, 30);
        assert_eq!(horizon_ending(&s, &roster), Ending::PerfectBalance);

        let stressed = Stats { stress: 61, ..s };
        assert_eq!(horizon_ending(&stressed, &roster), Ending::Legendary);
    }

    #[test]
    fn immediate_checks_follow_fixed_order() {
        let mut s = Stats::default();
        s.staff_morale = 0;
        s.stress = 100;
        assert_eq!(check_immediate(&s), Some(Ending::StaffRevolt));
        s.reputation = 0;
        assert_eq!(check_immediate(&s), Some(Ending::ReputationLoss));
    }

    #[test]
    fn preview_does_not_mutate() {
        let s = Stats { staff_morale: 5, ..Stats::default() };
        let deltas = StatDeltas::new().with(Stat::StaffMorale, -10);
        assert_eq!(would_terminate(&s, &deltas), Some(Ending::StaffRevolt));
        assert_eq!(s.staff_morale, 5);
        assert!(!is_risky(&deltas));
        assert!(is_risky(&StatDeltas::new().with(Stat::Stress, 16)));
    }
}
