use crate::model::game_context::GameContext;
use crate::model::lifestyle::LifestyleSlot;
use crate::model::run_state::{HistoryEntry, TOTAL_PERIODS};
use crate::model::stats::Stat;

/// Builds the prompts sent to the scenario generator.
/// Prompt text only. Nothing here talks to the network.
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn scenario(context: &GameContext) -> String {
        let mut prompt = String::new();

        push_system_prompt(&mut prompt);
        push_status_section(&mut prompt, context);
        push_office_section(&mut prompt, context);
        push_lifestyle_section(&mut prompt, context);
        push_history_section(&mut prompt, &context.recent_history);
        push_scenario_format(&mut prompt);

        prompt
    }

    pub fn action(context: &GameContext, action: &str) -> String {
        let mut prompt = String::new();

        push_system_prompt(&mut prompt);
        push_status_section(&mut prompt, context);
        push_office_section(&mut prompt, context);
        push_history_section(&mut prompt, &context.recent_history);
        push_director_action(&mut prompt, action);
        push_action_format(&mut prompt);

        prompt
    }
}

fn push_system_prompt(prompt: &mut String) {
    prompt.push_str(
        "You are the scenario writer for a management simulation. The player is the newly \
appointed director of a KOICA overseas office, serving a two-year term split into \
bimonthly periods.\n\n\
Rules:\n\
- Write grounded situations an international development office really faces: \
partner governments, headquarters audits, local staff, budget execution, field projects.\n\
- Every option must be a real trade-off. No option may be strictly best.\n\
- Stat changes are integers, usually between -20 and +20.\n\
- Never decide for the director.\n\n",
    );
}

fn push_status_section(prompt: &mut String, context: &GameContext) {
    prompt.push_str("CURRENT STATUS:\n");
    prompt.push_str(&format!(
        "- Year {} of 2, {} (period {} of {})\n",
        context.clock.year,
        context.clock.period_label(),
        context.clock.absolute_period(),
        TOTAL_PERIODS
    ));
    for stat in Stat::ALL {
        prompt.push_str(&format!("- {}: {}/100\n", stat.key(), context.stats.get(stat)));
    }
    prompt.push('\n');
}

fn push_office_section(prompt: &mut String, context: &GameContext) {
    prompt.push_str("OFFICE:\n");
    prompt.push_str(&format!(
        "- Principled deputy morale: {}\n- Locally minded deputy morale: {}\n",
        context.principled_morale, context.local_friendly_morale
    ));
    let s = &context.style;
    prompt.push_str(&format!(
        "- Director so far leaned on: reputation {}, budget {}, staff {}, projects {}; risk taking {}\n\n",
        s.reputation, s.budget, s.staff, s.project, s.risk_taking
    ));
}

fn push_lifestyle_section(prompt: &mut String, context: &GameContext) {
    let picks: Vec<String> = LifestyleSlot::ALL
        .into_iter()
        .filter_map(|slot| {
            context
                .lifestyle
                .get(slot)
                .map(|choice| format!("- {}: {}", slot.label(), choice.label()))
        })
        .collect();
    if picks.is_empty() {
        return;
    }
    prompt.push_str("PRIVATE LIFE:\n");
    for line in picks {
        prompt.push_str(&line);
        prompt.push('\n');
    }
    prompt.push('\n');
}

fn push_history_section(prompt: &mut String, history: &[HistoryEntry]) {
    if history.is_empty() {
        return;
    }
    prompt.push_str("RECENT DECISIONS:\n");
    push_history_lines(prompt, history);
    prompt.push('\n');
}

fn push_history_lines(prompt: &mut String, history: &[HistoryEntry]) {
    for entry in history {
        let deltas: Vec<String> = entry
            .deltas
            .iter()
            .filter(|(_, d)| *d != 0)
            .map(|(stat, d)| format!("{} {:+}", stat.key(), d))
            .collect();
        prompt.push_str(&format!(
            "- [{}] {}{}\n",
            entry.clock,
            entry.choice_text,
            if deltas.is_empty() {
                String::new()
            } else {
                format!(" ({})", deltas.join(", "))
            }
        ));
    }
}

fn push_director_action(prompt: &mut String, action: &str) {
    prompt.push_str("DIRECTOR'S ACTION:\n");
    prompt.push_str(action.trim());
    prompt.push_str("\n\n");
}

fn push_scenario_format(prompt: &mut String) {
    prompt.push_str(
        "Output Format:\n\
Respond with ONE JSON object and nothing else:\n\
{\"title\": string, \"description\": string, \"choices\": [\n\
  {\"text\": string, \"subtext\": string?, \"trade_off\": string?,\n\
   \"result\": {\"message\": string, \"stats\": {stat: int}, \"deputy_morale\": {\"principled\"|\"local_friendly\": int}?}}\n\
]}\n\
Give exactly three choices. Valid stat keys: reputation, budget_execution_rate, \
staff_morale, project_success, stress, wellbeing.\n",
    );
}

fn push_action_format(prompt: &mut String) {
    prompt.push_str(
        "Decide whether the action is feasible for an office director in this situation.\n\
Output Format:\n\
Respond with ONE JSON object and nothing else:\n\
{\"success\": bool, \"message\": string, \"stats\": {stat: int}}\n\
If success is false, explain why in message and leave stats empty.\n",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::run_state::{GameMode, RunState};

    #[test]
    fn scenario_prompt_carries_status_and_format() {
        let mut state = RunState::new(GameMode::Generative);
        state.stats.stress = 77;
        let prompt = PromptBuilder::scenario(&GameContext::from_state(&state));
        assert!(prompt.contains("stress: 77/100"));
        assert!(prompt.contains("Year 1 of 2, Jan-Feb"));
        assert!(prompt.contains("\"choices\""));
        assert!(!prompt.contains("RECENT DECISIONS"));
    }

    #[test]
    fn action_prompt_quotes_the_action() {
        let state = RunState::new(GameMode::Generative);
        let prompt = PromptBuilder::action(&GameContext::from_state(&state), "  Call the minister  ");
        assert!(prompt.contains("DIRECTOR'S ACTION:\nCall the minister\n"));
        assert!(prompt.contains("\"success\": bool"));
    }
}
