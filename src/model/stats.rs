use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;

pub fn clamp_stat(value: i32) -> i32 {
    value.clamp(STAT_MIN, STAT_MAX)
}

/// The six tracked work/life stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Reputation,
    BudgetExecutionRate,
    StaffMorale,
    ProjectSuccess,
    Stress,
    Wellbeing,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Reputation,
        Stat::BudgetExecutionRate,
        Stat::StaffMorale,
        Stat::ProjectSuccess,
        Stat::Stress,
        Stat::Wellbeing,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Stat::Reputation => "reputation",
            Stat::BudgetExecutionRate => "budget_execution_rate",
            Stat::StaffMorale => "staff_morale",
            Stat::ProjectSuccess => "project_success",
            Stat::Stress => "stress",
            Stat::Wellbeing => "wellbeing",
        }
    }

    /// Content files written before the execution-rate model still say `budget`.
    pub fn from_key(key: &str) -> Option<Stat> {
        match key.trim() {
            "reputation" => Some(Stat::Reputation),
            "budget" | "budget_execution_rate" => Some(Stat::BudgetExecutionRate),
            "staff_morale" => Some(Stat::StaffMorale),
            "project_success" => Some(Stat::ProjectSuccess),
            "stress" => Some(Stat::Stress),
            "wellbeing" => Some(Stat::Wellbeing),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stat::Reputation => "Reputation",
            Stat::BudgetExecutionRate => "Budget execution",
            Stat::StaffMorale => "Staff morale",
            Stat::ProjectSuccess => "Project success",
            Stat::Stress => "Stress",
            Stat::Wellbeing => "Wellbeing",
        }
    }

    pub fn focus(self) -> Option<Focus> {
        match self {
            Stat::Reputation => Some(Focus::Reputation),
            Stat::BudgetExecutionRate => Some(Focus::Budget),
            Stat::StaffMorale => Some(Focus::Staff),
            Stat::ProjectSuccess => Some(Focus::Project),
            Stat::Stress | Stat::Wellbeing => None,
        }
    }

    /// Stress is the only stat where an increase is bad news.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, Stat::Stress)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The four work dimensions a player can lean towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Reputation,
    Budget,
    Staff,
    Project,
}

impl Focus {
    pub const ALL: [Focus; 4] = [Focus::Reputation, Focus::Budget, Focus::Staff, Focus::Project];

    pub fn label(self) -> &'static str {
        match self {
            Focus::Reputation => "reputation",
            Focus::Budget => "budget",
            Focus::Staff => "staff",
            Focus::Project => "projects",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub reputation: i32,
    pub budget_execution_rate: i32,
    pub staff_morale: i32,
    pub project_success: i32,
    pub stress: i32,
    pub wellbeing: i32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            reputation: 40,
            budget_execution_rate: 30,
            staff_morale: 45,
            project_success: 35,
            stress: 25,
            wellbeing: 65,
        }
    }
}

impl Stats {
    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Reputation => self.reputation,
            Stat::BudgetExecutionRate => self.budget_execution_rate,
            Stat::StaffMorale => self.staff_morale,
            Stat::ProjectSuccess => self.project_success,
            Stat::Stress => self.stress,
            Stat::Wellbeing => self.wellbeing,
        }
    }

    fn slot_mut(&mut self, stat: Stat) -> &mut i32 {
        match stat {
            Stat::Reputation => &mut self.reputation,
            Stat::BudgetExecutionRate => &mut self.budget_execution_rate,
            Stat::StaffMorale => &mut self.staff_morale,
            Stat::ProjectSuccess => &mut self.project_success,
            Stat::Stress => &mut self.stress,
            Stat::Wellbeing => &mut self.wellbeing,
        }
    }

    /// `stat = clamp(stat + delta, 0, 100)` for every delta present.
    pub fn apply(&mut self, deltas: &StatDeltas) {
        for (stat, delta) in deltas.iter() {
            let slot = self.slot_mut(stat);
            *slot = clamp_stat(slot.saturating_add(delta));
        }
    }

    /// Reputation, budget, staff, project, in that order.
    pub fn work_stats(&self) -> [i32; 4] {
        [
            self.reputation,
            self.budget_execution_rate,
            self.staff_morale,
            self.project_success,
        ]
    }

    pub fn focus_value(&self, focus: Focus) -> i32 {
        match focus {
            Focus::Reputation => self.reputation,
            Focus::Budget => self.budget_execution_rate,
            Focus::Staff => self.staff_morale,
            Focus::Project => self.project_success,
        }
    }
}

/// A decoded stat-delta payload. Unknown keys are dropped at decode time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatDeltas(BTreeMap<Stat, i32>);

impl StatDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stat: Stat, delta: i32) -> Self {
        self.add(stat, delta);
        self
    }

    pub fn add(&mut self, stat: Stat, delta: i32) {
        let entry = self.0.entry(stat).or_insert(0);
        *entry = entry.saturating_add(delta);
    }

    pub fn get(&self, stat: Stat) -> i32 {
        self.0.get(&stat).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Stat, i32)> + '_ {
        self.0.iter().map(|(stat, delta)| (*stat, *delta))
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|d| *d == 0)
    }

    /// Sum of absolute deltas across every stat.
    pub fn total_magnitude(&self) -> i32 {
        self.0.values().map(|d| d.saturating_abs()).sum()
    }

    /// Decode a loosely keyed map, as produced by content files and generators.
    pub fn from_raw(raw: BTreeMap<String, i32>) -> Self {
        let mut deltas = Self::new();
        for (key, delta) in raw {
            match Stat::from_key(&key) {
                Some(stat) => deltas.add(stat, delta),
                None => tracing::debug!(key = %key, "ignoring unrecognized stat key"),
            }
        }
        deltas
    }
}

impl FromIterator<(Stat, i32)> for StatDeltas {
    fn from_iter<I: IntoIterator<Item = (Stat, i32)>>(iter: I) -> Self {
        let mut deltas = Self::new();
        for (stat, delta) in iter {
            deltas.add(stat, delta);
        }
        deltas
    }
}

impl Serialize for StatDeltas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: BTreeMap<&str, i32> = self.0.iter().map(|(s, d)| (s.key(), *d)).collect();
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatDeltas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, i32>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw))
    }
}

/// How a single delta reads to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaGrade {
    Excellent,
    Good,
    Fair,
    Caution,
    Danger,
}

impl DeltaGrade {
    pub fn of(delta: i32) -> Self {
        if delta >= 10 {
            DeltaGrade::Excellent
        } else if delta >= 5 {
            DeltaGrade::Good
        } else if delta >= 0 {
            DeltaGrade::Fair
        } else if delta >= -10 {
            DeltaGrade::Caution
        } else {
            DeltaGrade::Danger
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeltaGrade::Excellent => "excellent",
            DeltaGrade::Good => "good",
            DeltaGrade::Fair => "fair",
            DeltaGrade::Caution => "caution",
            DeltaGrade::Danger => "danger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn budget_alias_maps_to_execution_rate() {
        let deltas: StatDeltas =
            serde_json::from_str(r#"{"budget": 5, "budget_execution_rate": 3, "morale_of_cat": 9}"#)
                .unwrap();
        assert_eq!(deltas.get(Stat::BudgetExecutionRate), 8);
        assert_eq!(deltas.iter().count(), 1);
    }

    #[test]
    fn overflowing_delta_clamps_to_bounds() {
        let mut stats = Stats::default();
        stats.apply(&StatDeltas::new().with(Stat::Reputation, 500).with(Stat::Stress, -500));
        assert_eq!(stats.reputation, 100);
        assert_eq!(stats.stress, 0);
    }

    #[test]
    fn grade_bands() {
        assert_eq!(DeltaGrade::of(10), DeltaGrade::Excellent);
        assert_eq!(DeltaGrade::of(0), DeltaGrade::Fair);
        assert_eq!(DeltaGrade::of(-10), DeltaGrade::Caution);
        assert_eq!(DeltaGrade::of(-11), DeltaGrade::Danger);
    }

    fn stat_strategy() -> impl Strategy<Value = Stat> {
        prop::sample::select(Stat::ALL.to_vec())
    }

    proptest! {
        /// Property: no sequence of deltas can push any stat out of [0, 100]
        #[test]
        fn prop_stats_stay_clamped(
            steps in prop::collection::vec((stat_strategy(), -1000i32..1000), 0..64)
        ) {
            let mut stats = Stats::default();
            for (stat, delta) in steps {
                stats.apply(&StatDeltas::new().with(stat, delta));
                for s in Stat::ALL {
                    let v = stats.get(s);
                    prop_assert!((STAT_MIN..=STAT_MAX).contains(&v), "{} = {}", s, v);
                }
            }
        }
    }
}
