pub mod gemini;
pub mod openai;

use crate::domain::chat::ReplyMode;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::llm_config::LLMProvider;
use async_trait::async_trait;
use gemini::GeminiClient;
use openai::OpenAIClient;

/// One request/response exchange with a generative-text backend. The prompt
/// is sent as a single system-role message.
#[async_trait]
pub trait LLMClient {
    async fn complete(&self, config: &LLMConfig, prompt: &str, mode: ReplyMode) -> Result<String>;
}

pub struct RouterClient {
    openai: OpenAIClient,
    gemini: GeminiClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self {
            openai: OpenAIClient::new(),
            gemini: GeminiClient::new(),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn complete(&self, config: &LLMConfig, prompt: &str, mode: ReplyMode) -> Result<String> {
        match config.provider {
            LLMProvider::Gemini => self.gemini.complete(config, prompt, mode).await,
            LLMProvider::OpenAI => self.openai.complete(config, prompt, mode).await,
        }
    }
}
