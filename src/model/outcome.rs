use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::scenario::ENDING_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ending {
    ReputationLoss,
    StaffRevolt,
    Burnout,
    HealthCrisis,
    PerfectBalance,
    Legendary,
    Successful,
    Average,
    Struggling,
}

impl Ending {
    pub const ALL: [Ending; 9] = [
        Ending::ReputationLoss,
        Ending::StaffRevolt,
        Ending::Burnout,
        Ending::HealthCrisis,
        Ending::PerfectBalance,
        Ending::Legendary,
        Ending::Successful,
        Ending::Average,
        Ending::Struggling,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Ending::ReputationLoss => "reputation_loss",
            Ending::StaffRevolt => "staff_revolt",
            Ending::Burnout => "burnout",
            Ending::HealthCrisis => "health_crisis",
            Ending::PerfectBalance => "perfect_balance",
            Ending::Legendary => "legendary",
            Ending::Successful => "successful",
            Ending::Average => "average",
            Ending::Struggling => "struggling",
        }
    }

    /// Content node presenting this ending.
    pub fn node_id(self) -> String {
        format!("{ENDING_PREFIX}{}", self.id())
    }

    pub fn from_node_id(id: &str) -> Option<Ending> {
        let key = id.strip_prefix(ENDING_PREFIX)?;
        Ending::ALL.into_iter().find(|e| e.id() == key)
    }

    /// Endings reached before the term is over.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Ending::ReputationLoss | Ending::StaffRevolt | Ending::Burnout | Ending::HealthCrisis
        )
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Director archetype awarded at the end of a completed term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Innovative,
    Relaxed,
    Dedicated,
    Balanced,
    Gentle,
    PeopleCentered,
    CautiousDiplomat,
    Diplomatic,
    Enterprising,
    ResultsDriven,
    Practical,
    Struggling,
}

impl Archetype {
    pub const ALL: [Archetype; 12] = [
        Archetype::Innovative,
        Archetype::Relaxed,
        Archetype::Dedicated,
        Archetype::Balanced,
        Archetype::Gentle,
        Archetype::PeopleCentered,
        Archetype::CautiousDiplomat,
        Archetype::Diplomatic,
        Archetype::Enterprising,
        Archetype::ResultsDriven,
        Archetype::Practical,
        Archetype::Struggling,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Archetype::Innovative => "The Innovative Director",
            Archetype::Relaxed => "The Easygoing Director",
            Archetype::Dedicated => "The Dedicated Director",
            Archetype::Balanced => "The Balanced Director",
            Archetype::Gentle => "The Gentle Director",
            Archetype::PeopleCentered => "The People-Centered Director",
            Archetype::CautiousDiplomat => "The Cautious Diplomat",
            Archetype::Diplomatic => "The Diplomatic Director",
            Archetype::Enterprising => "The Enterprising Director",
            Archetype::ResultsDriven => "The Results-Driven Director",
            Archetype::Practical => "The Practical Director",
            Archetype::Struggling => "The Struggling Director",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ending_ids_map_back_from_node_ids() {
        for ending in Ending::ALL {
            assert_eq!(Ending::from_node_id(&ending.node_id()), Some(ending));
        }
        assert_eq!(Ending::from_node_id("ending_unknown"), None);
        assert_eq!(Ending::from_node_id("average"), None);
    }
}
