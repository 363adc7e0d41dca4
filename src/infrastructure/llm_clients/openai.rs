use super::LLMClient;
use crate::domain::chat::ReplyMode;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

/// OpenAI-compatible `/chat/completions` client.
pub struct OpenAIClient {
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::BackendUnreachable("Missing API key for OpenAI".to_string()))
    }

    pub(crate) fn completions_url(base_url: &str) -> String {
        if base_url.ends_with('/') {
            format!("{}chat/completions", base_url)
        } else {
            format!("{}/chat/completions", base_url)
        }
    }

    pub(crate) fn request_body(config: &LLMConfig, prompt: &str, mode: ReplyMode) -> serde_json::Value {
        let response_type = if mode.is_structured() {
            "json_object"
        } else {
            "text"
        };

        let mut body = json!({
            "model": config.model,
            "messages": [
                {
                    "role": "system",
                    "content": prompt
                }
            ],
            "response_format": { "type": response_type },
            "max_tokens": config.max_tokens,
        });
        if let Some(temperature) = config.temperature {
            body["temperature"] = json!(temperature);
        }
        body
    }
}

impl Default for OpenAIClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, config: &LLMConfig, prompt: &str, mode: ReplyMode) -> Result<String> {
        let api_key = Self::api_key(config)?;
        let url = Self::completions_url(&config.base_url);
        let body = Self::request_body(config, prompt, mode);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::BackendUnreachable(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::BackendUnreachable(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::BackendUnreachable(format!("Failed to parse JSON: {}", e)))?;

        debug!(
            response_id = json["id"].as_str().unwrap_or_default(),
            prompt_tokens = json["usage"]["prompt_tokens"].as_i64().unwrap_or_default(),
            completion_tokens = json["usage"]["completion_tokens"].as_i64().unwrap_or_default(),
            "chat completion received"
        );

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::BackendUnreachable("Invalid response format".to_string()))
    }
}
