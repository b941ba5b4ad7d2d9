use async_trait::async_trait;
use cardscope_core::{ProviderError, RewardProvider};
use cardscope_shared::RewardData;
use cardscope_store::app_config::ProviderConfig;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::RefreshError;

pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a credit card rewards researcher. Search the web for the current reward structure of the card the user names and answer with JSON only, no prose, in exactly this shape:
{"cardReward": {
  "base_rate": "1%",
  "bonus_categories": [{"category": "dining", "rate": "3%", "exclusions": ["merchant names excluded from this bonus"]}],
  "user_choice_categories": [{"options": ["gas", "online shopping", "travel"], "rate": "3%", "exclusions": []}],
  "rotating_categories": {"Q1": [{"category": "grocery stores", "rate": "5%", "exclusions": []}], "Q2": [], "Q3": [], "Q4": []}
}}
Use lower-case category names. Leave a section empty when the card has none. If the card cannot be found, answer {}."#;

/// Reward provider backed by the OpenAI Responses API with web search
pub struct OpenAiRewardProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Option<Vec<ContentItem>>,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl OpenAiRewardProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, RefreshError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| RefreshError::ClientError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/responses", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        })
    }

    fn request_body(&self, card_name: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "tools": [{"type": "web_search_preview"}],
            "input": [
                {"role": "system", "content": self.system_prompt},
                {"role": "user", "content": format!("The user has these cards: {}", card_name)},
            ],
        })
    }
}

#[async_trait]
impl RewardProvider for OpenAiRewardProvider {
    async fn fetch_reward_profile(&self, card_name: &str) -> Result<RewardData, ProviderError> {
        debug!(card = %card_name, model = %self.model, "Requesting reward details");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(card_name))
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Other(format!("Provider call failed: {}", status)));
        }

        let body: ResponsesBody = response.json().await.map_err(classify)?;
        parse_output(&body)
    }
}

fn classify(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Other(err.to_string())
    }
}

fn parse_output(body: &ResponsesBody) -> Result<RewardData, ProviderError> {
    if body.output.is_empty() {
        return Err(ProviderError::Other("No output from model".into()));
    }

    let text = body
        .output
        .iter()
        .filter_map(|item| item.content.as_deref())
        .flatten()
        .find(|c| c.kind == "output_text")
        .and_then(|c| c.text.as_deref())
        .ok_or_else(|| ProviderError::Other("No output_text from model".into()))?;

    RewardData::from_json(&strip_code_fences(text))
        .map_err(|e| ProviderError::Other(format!("Malformed reward JSON: {}", e)))
}

/// Drop Markdown code fences (```json ... ```) around a model answer
fn strip_code_fences(text: &str) -> String {
    let text = text.trim();
    if !text.starts_with("```") {
        return text.to_string();
    }
    text.replace("```json", "").replace("```", "").trim().to_string()
}
