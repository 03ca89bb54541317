use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::stats::clamp_stat;

pub const DEPUTY_STARTING_MORALE: i32 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Principled,
    LocalFriendly,
}

impl Personality {
    pub fn key(self) -> &'static str {
        match self {
            Personality::Principled => "principled",
            Personality::LocalFriendly => "local_friendly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterGroup {
    Deputies,
    Coordinators,
    YoungProfessionals,
    LocalStaff,
}

impl RosterGroup {
    pub const ALL: [RosterGroup; 4] = [
        RosterGroup::Deputies,
        RosterGroup::Coordinators,
        RosterGroup::YoungProfessionals,
        RosterGroup::LocalStaff,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RosterGroup::Deputies => "deputies",
            RosterGroup::Coordinators => "coordinators",
            RosterGroup::YoungProfessionals => "young_professionals",
            RosterGroup::LocalStaff => "local_staff",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RosterGroup::Deputies => "Deputy directors",
            RosterGroup::Coordinators => "Coordinators",
            RosterGroup::YoungProfessionals => "Young professionals",
            RosterGroup::LocalStaff => "Local staff",
        }
    }

    fn from_key(key: &str) -> Option<RosterGroup> {
        RosterGroup::ALL.into_iter().find(|g| g.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub role: String,
    pub morale: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<Personality>,
    /// Tracked for local staff only; nothing in the engine reads it yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_satisfaction: Option<i32>,
}

impl Member {
    fn new(name: &str, role: &str, morale: i32) -> Self {
        Self {
            name: name.to_string(),
            role: role.to_string(),
            morale,
            personality: None,
            salary_satisfaction: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoraleSelector {
    Personality(Personality),
    Index(usize),
    All,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleChange {
    pub name: String,
    pub group: RosterGroup,
    pub before: i32,
    pub after: i32,
}

/// The office's four staff collections. Sizes are fixed at construction;
/// only morale changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    deputies: Vec<Member>,
    coordinators: Vec<Member>,
    young_professionals: Vec<Member>,
    local_staff: Vec<Member>,
}

impl Default for Roster {
    fn default() -> Self {
        let mut principled = Member::new("Kim Won-chik", "Deputy Director", DEPUTY_STARTING_MORALE);
        principled.personality = Some(Personality::Principled);
        let mut local = Member::new("Park Hyun-ji", "Deputy Director", DEPUTY_STARTING_MORALE);
        local.personality = Some(Personality::LocalFriendly);

        let local_staff = [
            ("Amani", "Program Officer"),
            ("Baraka", "Program Officer"),
            ("Chausiku", "Program Officer"),
            ("Daudi", "Accountant"),
            ("Eshe", "Administrative Assistant"),
            ("Faraji", "Administrative Assistant"),
            ("Gamba", "Driver"),
            ("Hamisi", "Driver"),
            ("Imani", "IT Officer"),
            ("Juma", "Security Officer"),
        ]
        .into_iter()
        .map(|(name, role)| {
            let mut m = Member::new(name, role, 50);
            m.salary_satisfaction = Some(50);
            m
        })
        .collect();

        Self {
            deputies: vec![principled, local],
            coordinators: vec![
                Member::new("Lee Seo-yeon", "Coordinator", 50),
                Member::new("Choi Min-ho", "Coordinator", 50),
            ],
            young_professionals: vec![
                Member::new("Jung Ha-eun", "Young Professional", 55),
                Member::new("Kang Do-hyun", "Young Professional", 55),
            ],
            local_staff,
        }
    }
}

impl Roster {
    pub fn group(&self, group: RosterGroup) -> &[Member] {
        match group {
            RosterGroup::Deputies => &self.deputies,
            RosterGroup::Coordinators => &self.coordinators,
            RosterGroup::YoungProfessionals => &self.young_professionals,
            RosterGroup::LocalStaff => &self.local_staff,
        }
    }

    fn group_mut(&mut self, group: RosterGroup) -> &mut [Member] {
        match group {
            RosterGroup::Deputies => &mut self.deputies,
            RosterGroup::Coordinators => &mut self.coordinators,
            RosterGroup::YoungProfessionals => &mut self.young_professionals,
            RosterGroup::LocalStaff => &mut self.local_staff,
        }
    }

    pub fn deputy(&self, personality: Personality) -> Option<&Member> {
        self.deputies
            .iter()
            .find(|d| d.personality == Some(personality))
    }

    pub fn morale_by_personality(&self, personality: Personality) -> Option<i32> {
        self.deputy(personality).map(|d| d.morale)
    }

    pub fn morale_by_index(&self, group: RosterGroup, index: usize) -> Option<i32> {
        self.group(group).get(index).map(|m| m.morale)
    }

    /// Clamped morale update. Returns one change per member touched.
    pub fn apply_delta(
        &mut self,
        group: RosterGroup,
        selector: MoraleSelector,
        delta: i32,
    ) -> Vec<MoraleChange> {
        let mut changes = Vec::new();
        for (i, member) in self.group_mut(group).iter_mut().enumerate() {
            let selected = match selector {
                MoraleSelector::All => true,
                MoraleSelector::Index(idx) => idx == i,
                MoraleSelector::Personality(p) => member.personality == Some(p),
            };
            if !selected {
                continue;
            }
            let before = member.morale;
            member.morale = clamp_stat(before.saturating_add(delta));
            changes.push(MoraleChange {
                name: member.name.clone(),
                group,
                before,
                after: member.morale,
            });
        }
        changes
    }

    pub fn average(&self, group: RosterGroup) -> f64 {
        let members = self.group(group);
        if members.is_empty() {
            return 0.0;
        }
        members.iter().map(|m| m.morale as f64).sum::<f64>() / members.len() as f64
    }

    pub fn low_morale(&self, group: RosterGroup, threshold: i32) -> Vec<&Member> {
        self.group(group)
            .iter()
            .filter(|m| m.morale <= threshold)
            .collect()
    }
}

/// One entry of a roster-morale payload, e.g. `"principled": 5` or `"local_staff:3": -2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterDelta {
    pub group: RosterGroup,
    pub selector: MoraleSelector,
    pub delta: i32,
}

impl RosterDelta {
    pub fn parse_key(key: &str) -> Option<(RosterGroup, MoraleSelector)> {
        let key = key.trim();
        match key {
            "principled" => {
                return Some((
                    RosterGroup::Deputies,
                    MoraleSelector::Personality(Personality::Principled),
                ))
            }
            "local_friendly" => {
                return Some((
                    RosterGroup::Deputies,
                    MoraleSelector::Personality(Personality::LocalFriendly),
                ))
            }
            _ => {}
        }
        if let Some((group, index)) = key.split_once(':') {
            let group = RosterGroup::from_key(group.trim())?;
            let index = index.trim().parse::<usize>().ok()?;
            return Some((group, MoraleSelector::Index(index)));
        }
        RosterGroup::from_key(key).map(|g| (g, MoraleSelector::All))
    }

    fn key(&self) -> String {
        match self.selector {
            MoraleSelector::Personality(p) => p.key().to_string(),
            MoraleSelector::Index(i) => format!("{}:{}", self.group.key(), i),
            MoraleSelector::All => self.group.key().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDeltas(Vec<RosterDelta>);

impl RosterDeltas {
    pub fn iter(&self) -> impl Iterator<Item = &RosterDelta> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, delta: RosterDelta) {
        self.0.push(delta);
    }
}

impl Serialize for RosterDeltas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw: BTreeMap<String, i32> = self.0.iter().map(|d| (d.key(), d.delta)).collect();
        raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RosterDeltas {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, i32>::deserialize(deserializer)?;
        let mut deltas = RosterDeltas::default();
        for (key, delta) in raw {
            match RosterDelta::parse_key(&key) {
                Some((group, selector)) => deltas.push(RosterDelta { group, selector, delta }),
                None => tracing::warn!(key = %key, "ignoring unrecognized roster morale key"),
            }
        }
        Ok(deltas)
    }
}
