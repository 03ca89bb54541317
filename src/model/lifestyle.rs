use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::stats::{Stat, StatDeltas};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifestyleSlot {
    Transport,
    Housing,
    Leisure,
    Diet,
}

impl LifestyleSlot {
    pub const ALL: [LifestyleSlot; 4] = [
        LifestyleSlot::Transport,
        LifestyleSlot::Housing,
        LifestyleSlot::Leisure,
        LifestyleSlot::Diet,
    ];

    pub fn label(self) -> &'static str {
        match self {
            LifestyleSlot::Transport => "Transport",
            LifestyleSlot::Housing => "Housing",
            LifestyleSlot::Leisure => "Leisure",
            LifestyleSlot::Diet => "Diet",
        }
    }

    pub fn options(self) -> Vec<LifestyleChoice> {
        match self {
            LifestyleSlot::Transport => [Transport::BringFromKorea, Transport::BuyLocal, Transport::NoCar]
                .into_iter()
                .map(LifestyleChoice::Transport)
                .collect(),
            LifestyleSlot::Housing => [
                Housing::Spacious,
                Housing::Nice,
                Housing::NearOffice,
                Housing::Secure,
            ]
            .into_iter()
            .map(LifestyleChoice::Housing)
            .collect(),
            LifestyleSlot::Leisure => [
                Leisure::Reading,
                Leisure::Exercise,
                Leisure::Drinking,
                Leisure::Gaming,
            ]
            .into_iter()
            .map(LifestyleChoice::Leisure)
            .collect(),
            LifestyleSlot::Diet => [Diet::CookAtHome, Diet::EatOut, Diet::Mixed]
                .into_iter()
                .map(LifestyleChoice::Diet)
                .collect(),
        }
    }
}

impl fmt::Display for LifestyleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    BringFromKorea,
    BuyLocal,
    NoCar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Housing {
    Spacious,
    Nice,
    NearOffice,
    Secure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leisure {
    Reading,
    Exercise,
    Drinking,
    Gaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Diet {
    CookAtHome,
    EatOut,
    Mixed,
}

/// One pick made during the pre-term setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "slot", content = "option", rename_all = "snake_case")]
pub enum LifestyleChoice {
    Transport(Transport),
    Housing(Housing),
    Leisure(Leisure),
    Diet(Diet),
}

impl LifestyleChoice {
    pub fn slot(self) -> LifestyleSlot {
        match self {
            LifestyleChoice::Transport(_) => LifestyleSlot::Transport,
            LifestyleChoice::Housing(_) => LifestyleSlot::Housing,
            LifestyleChoice::Leisure(_) => LifestyleSlot::Leisure,
            LifestyleChoice::Diet(_) => LifestyleSlot::Diet,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LifestyleChoice::Transport(Transport::BringFromKorea) => "Ship my car from Korea",
            LifestyleChoice::Transport(Transport::BuyLocal) => "Buy a used car locally",
            LifestyleChoice::Transport(Transport::NoCar) => "No car, use taxis",
            LifestyleChoice::Housing(Housing::Spacious) => "Spacious house in the suburbs",
            LifestyleChoice::Housing(Housing::Nice) => "Upscale apartment downtown",
            LifestyleChoice::Housing(Housing::NearOffice) => "Small flat next to the office",
            LifestyleChoice::Housing(Housing::Secure) => "Gated compound",
            LifestyleChoice::Leisure(Leisure::Reading) => "Reading",
            LifestyleChoice::Leisure(Leisure::Exercise) => "Exercise",
            LifestyleChoice::Leisure(Leisure::Drinking) => "Evenings out with staff",
            LifestyleChoice::Leisure(Leisure::Gaming) => "Gaming",
            LifestyleChoice::Diet(Diet::CookAtHome) => "Cook at home",
            LifestyleChoice::Diet(Diet::EatOut) => "Eat out",
            LifestyleChoice::Diet(Diet::Mixed) => "A bit of both",
        }
    }

    /// Fixed one-off stat effect of this pick.
    pub fn deltas(self) -> StatDeltas {
        use Stat::*;
        let pairs: &[(Stat, i32)] = match self {
            LifestyleChoice::Transport(Transport::BringFromKorea) => &[(Stress, -5), (Wellbeing, 5)],
            LifestyleChoice::Transport(Transport::BuyLocal) => &[(Stress, 5), (Wellbeing, -3)],
            LifestyleChoice::Transport(Transport::NoCar) => &[(Stress, 8), (Wellbeing, -5)],
            LifestyleChoice::Housing(Housing::Spacious) => &[(Stress, -3), (Wellbeing, 8)],
            LifestyleChoice::Housing(Housing::Nice) => {
                &[(Stress, -5), (Wellbeing, 10), (BudgetExecutionRate, -5)]
            }
            LifestyleChoice::Housing(Housing::NearOffice) => &[(Stress, -10), (Wellbeing, -5)],
            LifestyleChoice::Housing(Housing::Secure) => &[(Stress, -5), (Wellbeing, 3)],
            LifestyleChoice::Leisure(Leisure::Reading) => &[(Stress, -8), (Wellbeing, 5)],
            LifestyleChoice::Leisure(Leisure::Exercise) => &[(Stress, -10), (Wellbeing, 15)],
            LifestyleChoice::Leisure(Leisure::Drinking) => {
                &[(Stress, -5), (StaffMorale, 8), (Wellbeing, -8)]
            }
            LifestyleChoice::Leisure(Leisure::Gaming) => &[(Stress, -12), (Wellbeing, -3)],
            LifestyleChoice::Diet(Diet::CookAtHome) => &[(Stress, 3), (Wellbeing, 10)],
            LifestyleChoice::Diet(Diet::EatOut) => &[(Stress, -5), (Wellbeing, -5), (Reputation, 3)],
            LifestyleChoice::Diet(Diet::Mixed) => &[(Wellbeing, 5)],
        };
        pairs.iter().copied().collect()
    }
}

/// The four setup picks. Each slot is written once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifestyle {
    pub transport: Option<Transport>,
    pub housing: Option<Housing>,
    pub leisure: Option<Leisure>,
    pub diet: Option<Diet>,
}

impl Lifestyle {
    pub fn get(&self, slot: LifestyleSlot) -> Option<LifestyleChoice> {
        match slot {
            LifestyleSlot::Transport => self.transport.map(LifestyleChoice::Transport),
            LifestyleSlot::Housing => self.housing.map(LifestyleChoice::Housing),
            LifestyleSlot::Leisure => self.leisure.map(LifestyleChoice::Leisure),
            LifestyleSlot::Diet => self.diet.map(LifestyleChoice::Diet),
        }
    }

    /// Stores the pick, or hands back the existing one if the slot is taken.
    pub fn record(&mut self, choice: LifestyleChoice) -> Result<(), LifestyleChoice> {
        if let Some(existing) = self.get(choice.slot()) {
            return Err(existing);
        }
        match choice {
            LifestyleChoice::Transport(t) => self.transport = Some(t),
            LifestyleChoice::Housing(h) => self.housing = Some(h),
            LifestyleChoice::Leisure(l) => self.leisure = Some(l),
            LifestyleChoice::Diet(d) => self.diet = Some(d),
        }
        Ok(())
    }

    pub fn missing(&self) -> Vec<LifestyleSlot> {
        LifestyleSlot::ALL
            .into_iter()
            .filter(|slot| self.get(*slot).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_is_write_once() {
        let mut lifestyle = Lifestyle::default();
        assert!(lifestyle.record(LifestyleChoice::Diet(Diet::Mixed)).is_ok());
        assert_eq!(
            lifestyle.record(LifestyleChoice::Diet(Diet::EatOut)),
            Err(LifestyleChoice::Diet(Diet::Mixed))
        );
        assert_eq!(lifestyle.diet, Some(Diet::Mixed));
        assert_eq!(lifestyle.missing().len(), 3);
    }

    #[test]
    fn nice_housing_costs_budget() {
        let d = LifestyleChoice::Housing(Housing::Nice).deltas();
        assert_eq!(d.get(Stat::BudgetExecutionRate), -5);
        assert_eq!(d.get(Stat::Wellbeing), 10);
    }

    #[test]
    fn every_slot_offers_options() {
        for slot in LifestyleSlot::ALL {
            let options = slot.options();
            assert!(!options.is_empty());
            assert!(options.iter().all(|o| o.slot() == slot));
        }
    }
}
