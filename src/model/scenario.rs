use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::model::roster::RosterDeltas;
use crate::model::stats::{Stat, StatDeltas, Stats};

pub const START_NODE: &str = "start";
pub const ENDING_PREFIX: &str = "ending_";
/// Placeholder id meaning "ask the generator for the next scenario".
pub const GENERATED_NODE: &str = "ai_generated";

const EMBEDDED_CONTENT: &str = include_str!("../../assets/scenarios.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("scenario content is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read scenario content: {0}")]
    Io(#[from] std::io::Error),
    #[error("scenario content has no 'start' node")]
    MissingStart,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConditionParseError {
    #[error("empty condition")]
    Empty,
    #[error("no comparison operator in '{0}'")]
    MissingOperator(String),
    #[error("unknown stat '{0}'")]
    UnknownStat(String),
    #[error("invalid threshold '{0}'")]
    InvalidThreshold(String),
    #[error("random conditions only support '<', got '{0}'")]
    UnsupportedRandomOperator(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
}

impl CompareOp {
    // Two-character operators first so ">=" is not read as ">".
    const TOKENS: [(&'static str, CompareOp); 5] = [
        (">=", CompareOp::Ge),
        ("<=", CompareOp::Le),
        ("==", CompareOp::Eq),
        (">", CompareOp::Gt),
        ("<", CompareOp::Lt),
    ];

    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Eq => "==",
        }
    }

    fn holds(self, lhs: i32, rhs: i32) -> bool {
        match self {
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Le => lhs <= rhs,
            CompareOp::Gt => lhs > rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Eq => lhs == rhs,
        }
    }
}

/// Gate on a scheduled effect, parsed once from strings such as
/// `"always"`, `"random < 0.3"` or `"project_success >= 50"`.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Always,
    RandomBelow(f64),
    Compare { stat: Stat, op: CompareOp, threshold: i32 },
    /// Kept verbatim so saves round-trip; always evaluates to false.
    Malformed(String),
}

impl Condition {
    pub fn parse(raw: &str) -> Result<Condition, ConditionParseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ConditionParseError::Empty);
        }
        if raw.eq_ignore_ascii_case("always") {
            return Ok(Condition::Always);
        }

        let (pos, token, op) = CompareOp::TOKENS
            .iter()
            .find_map(|(token, op)| raw.find(token).map(|pos| (pos, *token, *op)))
            .ok_or_else(|| ConditionParseError::MissingOperator(raw.to_string()))?;
        let lhs = raw[..pos].trim();
        let rhs = raw[pos + token.len()..].trim();

        if lhs.eq_ignore_ascii_case("random") {
            if op != CompareOp::Lt {
                return Err(ConditionParseError::UnsupportedRandomOperator(token.to_string()));
            }
            let p: f64 = rhs
                .parse()
                .map_err(|_| ConditionParseError::InvalidThreshold(rhs.to_string()))?;
            if !(0.0..=1.0).contains(&p) {
                return Err(ConditionParseError::InvalidThreshold(rhs.to_string()));
            }
            return Ok(Condition::RandomBelow(p));
        }

        let stat = Stat::from_key(lhs).ok_or_else(|| ConditionParseError::UnknownStat(lhs.to_string()))?;
        let threshold: i32 = rhs
            .parse()
            .map_err(|_| ConditionParseError::InvalidThreshold(rhs.to_string()))?;
        Ok(Condition::Compare { stat, op, threshold })
    }

    pub fn evaluate<R: Rng + ?Sized>(&self, stats: &Stats, rng: &mut R) -> bool {
        match self {
            Condition::Always => true,
            Condition::RandomBelow(p) => rng.gen::<f64>() < *p,
            Condition::Compare { stat, op, threshold } => op.holds(stats.get(*stat), *threshold),
            Condition::Malformed(_) => false,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("always"),
            Condition::RandomBelow(p) => write!(f, "random < {p}"),
            Condition::Compare { stat, op, threshold } => {
                write!(f, "{} {} {}", stat.key(), op.symbol(), threshold)
            }
            Condition::Malformed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Condition::parse(&raw).unwrap_or_else(|err| {
            tracing::warn!(condition = %raw, error = %err, "malformed delayed-effect condition");
            Condition::Malformed(raw)
        }))
    }
}

fn always() -> Condition {
    Condition::Always
}

/// A scheduled consequence attached to a choice. `trigger_period` is an
/// offset from the period in which the choice was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedEffectSpec {
    #[serde(default, alias = "effect_id")]
    pub id: Option<String>,
    pub trigger_period: u32,
    #[serde(default = "always")]
    pub condition: Condition,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stats: StatDeltas,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoiceResult {
    pub message: Option<String>,
    pub stats: StatDeltas,
    #[serde(alias = "roster_morale")]
    pub deputy_morale: RosterDeltas,
    pub delayed_effects: Vec<DelayedEffectSpec>,
    pub advance_time: bool,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_off: Option<String>,
    #[serde(default)]
    pub result: ChoiceResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioNode {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
}

impl ScenarioNode {
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    DanglingNext {
        node: String,
        choice: usize,
        target: String,
    },
    MissingNode(String),
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentIssue::DanglingNext { node, choice, target } => {
                write!(f, "{node} choice {choice} points at missing node '{target}'")
            }
            ContentIssue::MissingNode(id) => write!(f, "required node '{id}' is missing"),
        }
    }
}

/// The static scenario document: node id to node, read-only after load.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContent {
    nodes: HashMap<String, ScenarioNode>,
}

impl ScenarioContent {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let nodes: HashMap<String, ScenarioNode> = serde_json::from_str(json)?;
        if !nodes.contains_key(START_NODE) {
            return Err(ContentError::MissingStart);
        }
        Ok(Self { nodes })
    }

    pub fn embedded() -> Result<Self, ContentError> {
        Self::from_json(EMBEDDED_CONTENT)
    }

    pub fn load(path: &Path) -> Result<Self, ContentError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn get(&self, id: &str) -> Option<&ScenarioNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every `next` that does not resolve, plus any `required` id that is absent.
    pub fn validate<'a>(&self, required: impl IntoIterator<Item = &'a str>) -> Vec<ContentIssue> {
        let mut issues = Vec::new();
        let mut ids: Vec<&String> = self.nodes.keys().collect();
        ids.sort();

        for id in ids {
            let node = &self.nodes[id];
            for (i, choice) in node.choices.iter().enumerate() {
                if let Some(target) = &choice.result.next {
                    if target != GENERATED_NODE && !self.nodes.contains_key(target) {
                        issues.push(ContentIssue::DanglingNext {
                            node: id.clone(),
                            choice: i,
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        for id in required {
            if !self.nodes.contains_key(id) {
                issues.push(ContentIssue::MissingNode(id.to_string()));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn parses_condition_forms() {
        assert_eq!(Condition::parse("always"), Ok(Condition::Always));
        assert_eq!(Condition::parse("random < 0.3"), Ok(Condition::RandomBelow(0.3)));
        assert_eq!(
            Condition::parse("project_success >= 50"),
            Ok(Condition::Compare {
                stat: Stat::ProjectSuccess,
                op: CompareOp::Ge,
                threshold: 50
            })
        );
        assert_eq!(
            Condition::parse("reputation<50"),
            Ok(Condition::Compare {
                stat: Stat::Reputation,
                op: CompareOp::Lt,
                threshold: 50
            })
        );
    }

    #[test]
    fn rejects_bad_conditions() {
        assert!(matches!(Condition::parse("charisma >= 3"), Err(ConditionParseError::UnknownStat(_))));
        assert!(matches!(Condition::parse("stress >= lots"), Err(ConditionParseError::InvalidThreshold(_))));
        assert!(matches!(Condition::parse("sometimes"), Err(ConditionParseError::MissingOperator(_))));
        assert!(matches!(
            Condition::parse("random > 0.5"),
            Err(ConditionParseError::UnsupportedRandomOperator(_))
        ));
    }

    #[test]
    fn malformed_condition_decodes_and_is_false() {
        let spec: DelayedEffectSpec =
            serde_json::from_str(r#"{"trigger_period": 2, "condition": "when pigs fly"}"#).unwrap();
        assert_eq!(spec.condition, Condition::Malformed("when pigs fly".into()));
        let mut rng = StdRng::seed_from_u64(1);
        assert!(!spec.condition.evaluate(&Stats::default(), &mut rng));
    }

    #[test]
    fn missing_optional_fields_are_no_ops() {
        let node: ScenarioNode = serde_json::from_str(
            r#"{"title": "t", "description": "d", "choices": [{"text": "go", "result": {}}]}"#,
        )
        .unwrap();
        let result = &node.choices[0].result;
        assert!(result.stats.is_empty());
        assert!(result.deputy_morale.is_empty());
        assert!(!result.advance_time);
        assert!(result.next.is_none());
    }

    #[test]
    fn validate_reports_dangling_next() {
        let content = ScenarioContent::from_json(
            r#"{
                "start": {"title": "s", "description": "d",
                          "choices": [{"text": "a", "result": {"next": "nowhere"}}]}
            }"#,
        )
        .unwrap();
        let issues = content.validate(["ending_burnout"]);
        assert_eq!(issues.len(), 2);
        assert!(matches!(&issues[0], ContentIssue::DanglingNext { target, .. } if target == "nowhere"));
    }

    #[test]
    fn embedded_content_loads() {
        let content = ScenarioContent::embedded().unwrap();
        assert!(content.contains(START_NODE));
    }
}
