use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::scenario::{ScenarioNode, GENERATED_NODE};
use crate::model::stats::StatDeltas;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("no JSON object in model output")]
    NoJson,
    #[error("invalid model output: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("generated scenario has no choices")]
    NoChoices,
}

/// Result of asking the generator whether a free-form action works out.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ActionOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stats: StatDeltas,
}

/// Models like to wrap JSON in prose or code fences; keep the outermost object.
fn extract_object(raw: &str) -> Result<&str, DecodeError> {
    let start = raw.find('{').ok_or(DecodeError::NoJson)?;
    let end = raw.rfind('}').ok_or(DecodeError::NoJson)?;
    if end < start {
        return Err(DecodeError::NoJson);
    }
    Ok(&raw[start..=end])
}

/// Decode a generated node and force every choice onto the generative track.
pub fn decode_generated_node(raw: &str) -> Result<ScenarioNode, DecodeError> {
    let json = extract_object(raw)?;
    let value: Value = serde_json::from_str(json)?;

    // Some models nest the node under "scenario".
    let value = match value {
        Value::Object(mut map) if !map.contains_key("title") && map.contains_key("scenario") => {
            map.remove("scenario").unwrap_or(Value::Null)
        }
        other => other,
    };

    let mut node: ScenarioNode = serde_json::from_value(value)?;
    if node.choices.is_empty() {
        return Err(DecodeError::NoChoices);
    }
    for choice in &mut node.choices {
        choice.result.advance_time = true;
        choice.result.next = Some(GENERATED_NODE.to_string());
    }
    Ok(node)
}

pub fn decode_action_outcome(raw: &str) -> Result<ActionOutcome, DecodeError> {
    let json = extract_object(raw)?;
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::stats::Stat;

    #[test]
    fn strips_fences_and_stamps_choices() {
        let raw = "Here you go:\n```json\n{\"title\": \"Audit\", \"description\": \"HQ calls.\", \
                   \"choices\": [{\"text\": \"Comply\", \"result\": {\"stats\": {\"reputation\": 5}, \"next\": \"period_4\"}}]}\n```";
        let node = decode_generated_node(raw).unwrap();
        assert_eq!(node.title, "Audit");
        let result = &node.choices[0].result;
        assert!(result.advance_time);
        assert_eq!(result.next.as_deref(), Some(GENERATED_NODE));
        assert_eq!(result.stats.get(Stat::Reputation), 5);
    }

    #[test]
    fn accepts_nested_scenario_key() {
        let raw = r#"{"scenario": {"title": "t", "description": "d", "choices": [{"text": "a"}]}}"#;
        assert!(decode_generated_node(raw).is_ok());
    }

    #[test]
    fn rejects_choiceless_and_garbage() {
        assert!(matches!(
            decode_generated_node(r#"{"title": "t", "description": "d"}"#),
            Err(DecodeError::NoChoices)
        ));
        assert!(matches!(decode_generated_node("I cannot help"), Err(DecodeError::NoJson)));
        assert!(matches!(decode_generated_node("{not json}"), Err(DecodeError::Invalid(_))));
    }

    #[test]
    fn action_outcome_defaults() {
        let outcome = decode_action_outcome(r#"{"success": true, "message": "ok"}"#).unwrap();
        assert!(outcome.success);
        assert!(outcome.stats.is_empty());
    }
}
