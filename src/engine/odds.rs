use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::classify::{classify_archetype, ArchetypeInput};
use crate::model::outcome::Archetype;
use crate::model::run_state::StyleCounters;
use crate::model::stats::Stats;

#[derive(Debug, Clone, Copy)]
enum FocusSpread {
    Single,
    Dual,
    Even,
    Random,
}

/// A plausible end-of-term snapshot, drawn the way the balance sheet assumes
/// real runs end up.
pub fn random_input<R: Rng + ?Sized>(rng: &mut R) -> ArchetypeInput {
    let total_choices: u32 = rng.gen_range(20..=35);
    let spread = [
        FocusSpread::Single,
        FocusSpread::Dual,
        FocusSpread::Even,
        FocusSpread::Random,
    ]
    .choose(rng)
    .copied()
    .unwrap_or(FocusSpread::Random);

    let mut counts = [0u32; 4];
    match spread {
        FocusSpread::Single => {
            let main = rng.gen_range(0..4);
            for (i, c) in counts.iter_mut().enumerate() {
                *c = if i == main { rng.gen_range(8..=15) } else { rng.gen_range(0..=3) };
            }
        }
        FocusSpread::Dual => {
            let picked: Vec<usize> = rand::seq::index::sample(rng, 4, 2).into_vec();
            for (i, c) in counts.iter_mut().enumerate() {
                *c = if picked.contains(&i) { rng.gen_range(6..=12) } else { rng.gen_range(0..=3) };
            }
        }
        FocusSpread::Even => {
            let avg = total_choices / 4;
            for c in counts.iter_mut() {
                *c = rng.gen_range(avg - 2..=avg + 2);
            }
        }
        FocusSpread::Random => {
            for c in counts.iter_mut() {
                *c = rng.gen_range(0..=10);
            }
        }
    }

    let style = StyleCounters {
        reputation: counts[0],
        budget: counts[1],
        staff: counts[2],
        project: counts[3],
        risk_taking: rng.gen_range(0..=total_choices),
    };
    let stats = Stats {
        reputation: rng.gen_range(20..=90),
        budget_execution_rate: rng.gen_range(20..=90),
        staff_morale: rng.gen_range(20..=90),
        project_success: rng.gen_range(20..=90),
        stress: rng.gen_range(0..=100),
        wellbeing: rng.gen_range(0..=100),
    };
    ArchetypeInput {
        stats,
        style,
        total_choices,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsReport {
    pub samples: u32,
    pub counts: BTreeMap<Archetype, u32>,
}

impl OddsReport {
    pub fn percent(&self, archetype: Archetype) -> f64 {
        if self.samples == 0 {
            return 0.0;
        }
        *self.counts.get(&archetype).unwrap_or(&0) as f64 / self.samples as f64 * 100.0
    }

    /// Most likely first.
    pub fn ranked(&self) -> Vec<(Archetype, u32)> {
        let mut rows: Vec<(Archetype, u32)> = self.counts.iter().map(|(a, c)| (*a, *c)).collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows
    }
}

pub fn estimate_odds<R: Rng + ?Sized>(samples: u32, rng: &mut R) -> OddsReport {
    let mut report = OddsReport {
        samples,
        counts: BTreeMap::new(),
    };
    for _ in 0..samples {
        let input = random_input(rng);
        *report.counts.entry(classify_archetype(&input, rng)).or_insert(0) += 1;
    }
    tracing::debug!(samples, kinds = report.counts.len(), "archetype odds estimated");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn sampled_inputs_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..500 {
            let input = random_input(&mut rng);
            assert!((20..=35).contains(&input.total_choices));
            assert!(input.style.risk_taking <= input.total_choices);
            for v in input.stats.work_stats() {
                assert!((20..=90).contains(&v));
            }
        }
    }

    #[test]
    fn counts_add_up_and_spread_out() {
        let mut rng = StdRng::seed_from_u64(2024);
        let report = estimate_odds(4000, &mut rng);
        assert_eq!(report.counts.values().sum::<u32>(), 4000);
        assert!(report.counts.len() >= 6);
        let total: f64 = Archetype::ALL.iter().map(|a| report.percent(*a)).sum();
        assert!((total - 100.0).abs() < 1e-6);
        let ranked = report.ranked();
        assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
    }
}
