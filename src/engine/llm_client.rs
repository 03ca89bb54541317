use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::engine::config::LlmConfig;
use crate::engine::graph::ScenarioGenerator;
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::game_context::GameContext;

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
}

/// OpenAI-compatible chat-completions client.
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn api_key(&self) -> Option<String> {
        self.config
            .api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
    }

    pub fn complete(&self, prompt: String) -> Result<String> {
        let req = ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "system".into(),
                content: prompt,
            }],
        };

        let mut request = self.client.post(&self.config.endpoint).json(&req);
        if let Some(key) = self.api_key() {
            request = request.bearer_auth(key);
        }

        let resp = request
            .send()?
            .error_for_status()?
            .json::<ChatCompletionResponse>()?;

        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("completion returned no choices"))
    }

    /// Lists models on the configured server.
    pub fn test_connection(&self) -> Result<String> {
        let url = models_url(&self.config.endpoint);
        let resp: serde_json::Value = self.client.get(url).send()?.error_for_status()?.json()?;

        Ok(format!(
            "Connected ({} models available)",
            resp["data"].as_array().map(|a| a.len()).unwrap_or(0)
        ))
    }
}

/// `.../v1/chat/completions` -> `.../v1/models`
fn models_url(endpoint: &str) -> String {
    match endpoint.find("/chat/completions") {
        Some(i) => format!("{}/models", &endpoint[..i]),
        None => format!("{}/models", endpoint.trim_end_matches('/')),
    }
}

impl ScenarioGenerator for LlmClient {
    fn generate_scenario(&self, context: &GameContext) -> Result<String> {
        self.complete(PromptBuilder::scenario(context))
    }

    fn interpret_action(&self, context: &GameContext, action: &str) -> Result<String> {
        self.complete(PromptBuilder::action(context, action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn models_url_from_completions_endpoint() {
        assert_eq!(
            models_url("http://localhost:1234/v1/chat/completions"),
            "http://localhost:1234/v1/models"
        );
        assert_eq!(models_url("http://host/v1/"), "http://host/v1/models");
    }

    #[test]
    fn request_serializes_openai_shape() {
        let req = ChatCompletionRequest {
            model: "m".into(),
            temperature: 0.5,
            messages: vec![ChatMessage {
                role: "system".into(),
                content: "hi".into(),
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["model"], "m");
    }
}
