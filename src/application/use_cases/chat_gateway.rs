use crate::application::use_cases::prompt_engine::PromptEngine;
use crate::domain::chat::{ChatResult, ReplyMode};
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::substitution::SubstitutionSet;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::reporting::{EvaluationReporter, InteractionRecord};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// Renders a prompt, sends it to the chat backend and reports the exchange.
pub struct ChatGateway {
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    reporter: Arc<dyn EvaluationReporter + Send + Sync>,
    config: LLMConfig,
}

impl ChatGateway {
    pub fn new(
        llm_client: Arc<dyn LLMClient + Send + Sync>,
        reporter: Arc<dyn EvaluationReporter + Send + Sync>,
        config: LLMConfig,
    ) -> Self {
        Self {
            llm_client,
            reporter,
            config,
        }
    }

    /// Backend failures are returned as is and never retried. A failing
    /// reporter only logs; the evaluation id is minted beforehand and stays
    /// valid.
    pub async fn chat(
        &self,
        raw_answer: &str,
        prompt_template: &str,
        substitutions: &SubstitutionSet,
        mode: ReplyMode,
    ) -> Result<ChatResult> {
        let prompt = PromptEngine::render(prompt_template, substitutions);

        let started_at = Utc::now();
        let content = self.llm_client.complete(&self.config, &prompt, mode).await?;
        let finished_at = Utc::now();

        let evaluation_id = self.reporter.new_evaluation_id();
        let record = InteractionRecord {
            full_prompt: prompt,
            input: raw_answer.to_string(),
            output: content.clone(),
            started_at,
            finished_at,
            model: self.config.model.clone(),
        };
        if let Err(err) = self.reporter.report_interaction(&evaluation_id, &record).await {
            warn!(evaluation_id = %evaluation_id, error = %err, "Failed to report interaction");
        }

        debug!(
            evaluation_id = %evaluation_id,
            structured = mode.is_structured(),
            elapsed_ms = (finished_at - started_at).num_milliseconds(),
            "Chat completed"
        );

        Ok(ChatResult {
            content,
            evaluation_id,
        })
    }
}
