use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error};

use crate::config::LlmConfig;
use crate::error::LlmError;

/// Anything that can turn a prompt into a completion.
///
/// Single-shot: no tool calls, no streaming.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": self.temperature,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = api_error_message(&body);
            error!(%status, %message, "model API returned an error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let json_resp: serde_json::Value = response.json().await?;
        let content = json_resp["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::NoContent(json_resp.to_string()))?;

        debug!(model = %self.model, reply = %content, "model replied");
        Ok(content.to_string())
    }
}

const ERROR_BODY_MAX_CHARS: usize = 200;

/// Best-effort message from a failed completion response. Proxies often
/// answer with HTML, so non-JSON bodies are passed through, truncated.
fn api_error_message(body: &str) -> String {
    if let Some(message) = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
    {
        return message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Unknown API error".to_string()
    } else {
        trimmed.chars().take(ERROR_BODY_MAX_CHARS).collect()
    }
}
