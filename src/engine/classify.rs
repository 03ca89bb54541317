use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::outcome::Archetype;
use crate::model::run_state::{RunState, StyleCounters};
use crate::model::stats::{Focus, Stats};

/// Snapshot the archetype scoring reads. Built from a finished run or
/// sampled by the odds estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeInput {
    pub stats: Stats,
    pub style: StyleCounters,
    pub total_choices: u32,
}

impl ArchetypeInput {
    pub fn from_state(state: &RunState) -> Self {
        Self {
            stats: state.stats,
            style: state.style,
            total_choices: state.total_choices(),
        }
    }

    pub fn risk_ratio(&self) -> f64 {
        if self.total_choices == 0 {
            0.0
        } else {
            self.style.risk_taking as f64 / self.total_choices as f64
        }
    }
}

struct Features {
    max_stat: i32,
    avg_stat: f64,
    variance: f64,
    risk_ratio: f64,
    dominant: Option<Focus>,
}

impl Features {
    fn of(input: &ArchetypeInput) -> Self {
        let work = input.stats.work_stats();
        let max_stat = work.iter().copied().max().unwrap_or(50);
        let avg_stat = work.iter().map(|v| *v as f64).sum::<f64>() / work.len() as f64;
        let variance =
            work.iter().map(|v| (*v as f64 - avg_stat).powi(2)).sum::<f64>() / work.len() as f64;
        Self {
            max_stat,
            avg_stat,
            variance,
            risk_ratio: input.risk_ratio(),
            dominant: input.style.dominant(),
        }
    }
}

/// Points for a focus-led archetype: dominant bonus, counter tiers, stat tiers.
fn focus_points(
    f: &Features,
    focus: Focus,
    dominant_bonus: u32,
    counter: u32,
    counter_tiers: &[(u32, u32)],
    stat: i32,
    stat_tiers: &[(i32, u32)],
) -> u32 {
    let mut score = 0;
    if f.dominant == Some(focus) {
        score += dominant_bonus;
    }
    score += counter_tiers
        .iter()
        .find(|(min, _)| counter >= *min)
        .map_or(0, |(_, pts)| *pts);
    score += stat_tiers
        .iter()
        .find(|(min, _)| stat >= *min)
        .map_or(0, |(_, pts)| *pts);
    score
}

/// Independent point totals for every archetype, in `Archetype::ALL` order.
pub fn archetype_scores(input: &ArchetypeInput) -> [(Archetype, u32); 12] {
    let f = Features::of(input);
    let s = &input.stats;
    let style = &input.style;

    let innovative = {
        let mut score = 0;
        score += if f.risk_ratio > 0.45 {
            50
        } else if f.risk_ratio > 0.35 {
            30
        } else if f.risk_ratio > 0.25 {
            10
        } else {
            0
        };
        score += if f.max_stat >= 70 {
            30
        } else if f.max_stat >= 60 {
            20
        } else if f.max_stat >= 50 {
            10
        } else {
            0
        };
        score
    };

    let relaxed = {
        let mut score = 0;
        score += if s.wellbeing >= 70 {
            40
        } else if s.wellbeing >= 60 {
            25
        } else if s.wellbeing >= 50 {
            10
        } else {
            0
        };
        score += if s.stress <= 30 {
            40
        } else if s.stress <= 40 {
            25
        } else if s.stress <= 50 {
            10
        } else {
            0
        };
        if f.avg_stat >= 50.0 {
            score += 20;
        }
        score
    };

    let dedicated = {
        let mut score = 0;
        score += if s.stress >= 65 {
            40
        } else if s.stress >= 55 {
            30
        } else if s.stress >= 45 {
            20
        } else {
            0
        };
        score += if f.avg_stat >= 60.0 {
            40
        } else if f.avg_stat >= 50.0 {
            30
        } else if f.avg_stat >= 40.0 {
            20
        } else {
            0
        };
        score
    };

    let balanced = {
        let mut score = 0;
        score += if f.variance < 250.0 {
            45
        } else if f.variance < 350.0 {
            35
        } else if f.variance < 450.0 {
            25
        } else if f.variance < 600.0 {
            15
        } else {
            0
        };
        score += if f.avg_stat >= 50.0 {
            40
        } else if f.avg_stat >= 40.0 {
            30
        } else if f.avg_stat >= 30.0 {
            20
        } else {
            0
        };
        score
    };

    let gentle = {
        let mut score = focus_points(&f, Focus::Staff, 32, style.staff, &[(5, 30), (3, 18)], 0, &[]);
        score += if s.stress <= 40 {
            30
        } else if s.stress <= 55 {
            18
        } else {
            0
        };
        if s.staff_morale >= 60 {
            score += 20;
        }
        score
    };

    let people_centered = focus_points(
        &f,
        Focus::Staff,
        35,
        style.staff,
        &[(5, 35), (3, 20), (1, 10)],
        s.staff_morale,
        &[(65, 30), (55, 20), (45, 10)],
    );

    let cautious_diplomat = {
        let mut score = focus_points(
            &f,
            Focus::Reputation,
            35,
            style.reputation,
            &[(5, 30), (3, 15)],
            s.reputation,
            &[(60, 20)],
        );
        score += if f.risk_ratio < 0.15 {
            35
        } else if f.risk_ratio < 0.25 {
            20
        } else if f.risk_ratio < 0.35 {
            10
        } else {
            0
        };
        score
    };

    let diplomatic = focus_points(
        &f,
        Focus::Reputation,
        35,
        style.reputation,
        &[(5, 35), (3, 20), (1, 10)],
        s.reputation,
        &[(65, 30), (55, 20), (45, 10)],
    );

    let enterprising = {
        let mut score = focus_points(
            &f,
            Focus::Project,
            28,
            style.project,
            &[(5, 26), (3, 16)],
            s.project_success,
            &[(60, 16)],
        );
        score += if f.risk_ratio > 0.32 {
            30
        } else if f.risk_ratio > 0.24 {
            20
        } else if f.risk_ratio > 0.17 {
            10
        } else {
            0
        };
        score
    };

    let results_driven = focus_points(
        &f,
        Focus::Project,
        32,
        style.project,
        &[(5, 32), (3, 22), (1, 14)],
        s.project_success,
        &[(65, 30), (55, 22), (45, 14)],
    );

    let practical = focus_points(
        &f,
        Focus::Budget,
        28,
        style.budget,
        &[(5, 28), (3, 18), (1, 10)],
        s.budget_execution_rate,
        &[(65, 25), (55, 18), (45, 10)],
    );

    let struggling = {
        let mut score = if f.avg_stat < 45.0 {
            60
        } else if f.avg_stat < 50.0 {
            40
        } else if f.avg_stat < 55.0 {
            20
        } else {
            0
        };
        if f.max_stat < 50 {
            score += 30;
        }
        score
    };

    [
        (Archetype::Innovative, innovative),
        (Archetype::Relaxed, relaxed),
        (Archetype::Dedicated, dedicated),
        (Archetype::Balanced, balanced),
        (Archetype::Gentle, gentle),
        (Archetype::PeopleCentered, people_centered),
        (Archetype::CautiousDiplomat, cautious_diplomat),
        (Archetype::Diplomatic, diplomatic),
        (Archetype::Enterprising, enterprising),
        (Archetype::ResultsDriven, results_driven),
        (Archetype::Practical, practical),
        (Archetype::Struggling, struggling),
    ]
}

/// Archetypes sharing the top score.
pub fn top_archetypes(scores: &[(Archetype, u32)]) -> Vec<Archetype> {
    let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    scores
        .iter()
        .filter(|(_, s)| *s == best)
        .map(|(a, _)| *a)
        .collect()
}

/// Highest score wins; ties are settled by a uniform draw.
pub fn classify_archetype<R: Rng + ?Sized>(input: &ArchetypeInput, rng: &mut R) -> Archetype {
    let top = top_archetypes(&archetype_scores(input));
    top.choose(rng).copied().unwrap_or(Archetype::Struggling)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeadershipStyle {
    Innovative,
    Challenging,
    Balanced,
    Cautious,
}

impl LeadershipStyle {
    pub fn from_risk_ratio(ratio: f64) -> Self {
        if ratio > 0.35 {
            LeadershipStyle::Innovative
        } else if ratio > 0.2 {
            LeadershipStyle::Challenging
        } else if ratio < 0.1 {
            LeadershipStyle::Cautious
        } else {
            LeadershipStyle::Balanced
        }
    }

    pub fn adjective(self) -> &'static str {
        match self {
            LeadershipStyle::Innovative => "innovative",
            LeadershipStyle::Challenging => "bold",
            LeadershipStyle::Balanced => "balanced",
            LeadershipStyle::Cautious => "careful",
        }
    }
}

/// End-of-term narrative summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debrief {
    pub archetype: Archetype,
    pub leadership: LeadershipStyle,
    pub top_concern: Option<Focus>,
    pub crises: Vec<String>,
    pub successes: Vec<String>,
}

impl Debrief {
    pub fn new(input: &ArchetypeInput, archetype: Archetype) -> Self {
        let s = &input.stats;
        let crises = [
            (s.reputation < 50, "a reputation crisis"),
            (s.staff_morale < 50, "unrest among the staff"),
            (s.stress >= 60, "crushing stress"),
            (s.budget_execution_rate < 60, "a struggle to execute the budget"),
        ];
        let successes = [
            (s.reputation >= 60, "hard-won trust"),
            (s.project_success >= 60, "projects that delivered"),
            (s.staff_morale >= 60, "a team that pulled together"),
            (s.budget_execution_rate >= 70, "a budget well spent"),
        ];
        let pick = |list: &[(bool, &str)]| -> Vec<String> {
            list.iter()
                .filter(|(hit, _)| *hit)
                .take(2)
                .map(|(_, text)| text.to_string())
                .collect()
        };

        Self {
            archetype,
            leadership: LeadershipStyle::from_risk_ratio(input.risk_ratio()),
            top_concern: input.style.top_concern(),
            crises: pick(&crises[..]),
            successes: pick(&successes[..]),
        }
    }

    pub fn paragraphs(&self) -> Vec<String> {
        let mut out = vec!["Congratulations. You made it through two demanding years.".to_string()];

        let mut middle = match (self.crises.is_empty(), self.successes.is_empty()) {
            (false, false) => format!(
                "There was {}, and there was {}.",
                self.crises.join(" and "),
                self.successes.join(" and ")
            ),
            (false, true) => format!("You faced {}, and you did not waver.", self.crises.join(" and ")),
            (true, false) => format!("There were bright moments: {}.", self.successes.join(" and ")),
            (true, true) => "Big and small things happened along the way.".to_string(),
        };
        middle.push_str(
            " Budget shortfalls, cultural friction and surprises kept coming, and you kept moving forward.",
        );
        out.push(middle);

        let concern = self.top_concern.map_or("running the office", Focus::label);
        out.push(format!(
            "Your commitment to {} and your {} leadership made a real difference to people here.",
            concern,
            self.leadership.adjective()
        ));
        out.push(format!("People will remember you as {}.", self.archetype));
        out
    }
}
