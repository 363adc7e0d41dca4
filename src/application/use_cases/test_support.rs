use crate::domain::chat::ReplyMode;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::opinion::{Annotation, OpinionReported};
use crate::domain::question::{QuestionDefinition, QuestionPrompts, ScoringRubric};
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::reporting::{EvaluationReporter, InteractionRecord};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Answers by the first rule whose needle appears in the prompt. Stages run
/// concurrently, so replies can't be handed out in call order.
#[derive(Default)]
pub struct ScriptedLLM {
    rules: Vec<(String, Result<String>)>,
    delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, ReplyMode)>>,
}

impl ScriptedLLM {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), Ok(reply.to_string())));
        self
    }

    pub fn fail(mut self, needle: &str) -> Self {
        self.rules.push((
            needle.to_string(),
            Err(AppError::BackendUnreachable("connection refused".to_string())),
        ));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(prompt, _)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LLMClient for ScriptedLLM {
    async fn complete(&self, _config: &LLMConfig, prompt: &str, mode: ReplyMode) -> Result<String> {
        self.calls.lock().unwrap().push((prompt.to_string(), mode));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Err(AppError::BackendUnreachable(format!("no reply for {prompt}"))))
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub fail: bool,
    pub interactions: Mutex<Vec<(String, InteractionRecord)>>,
    pub opinions: Mutex<Vec<(String, Annotation)>>,
}

impl RecordingReporter {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl EvaluationReporter for RecordingReporter {
    async fn report_interaction(
        &self,
        evaluation_id: &str,
        record: &InteractionRecord,
    ) -> Result<()> {
        if self.fail {
            return Err(AppError::Internal("reporting sink down".to_string()));
        }
        self.interactions
            .lock()
            .unwrap()
            .push((evaluation_id.to_string(), record.clone()));
        Ok(())
    }

    async fn report_opinion(
        &self,
        evaluation_id: &str,
        annotation: Annotation,
    ) -> Result<OpinionReported> {
        if self.fail {
            return Err(AppError::Internal("reporting sink down".to_string()));
        }
        self.opinions
            .lock()
            .unwrap()
            .push((evaluation_id.to_string(), annotation));
        Ok(OpinionReported {
            reported: true,
            success: true,
            message: "Opinion recorded".to_string(),
        })
    }
}

/// Question whose prompts are tagged so [`ScriptedLLM`] can tell the stages
/// apart.
pub fn sample_question() -> QuestionDefinition {
    QuestionDefinition {
        id: "q-trace".to_string(),
        question: "What is a trace?".to_string(),
        version: "1".to_string(),
        prompts: QuestionPrompts {
            category_prompt: "[category] Classify THEIR_ANSWER to QUESTION".to_string(),
            response_prompt: "[response] Reply in a CATEGORY way to THEIR_ANSWER".to_string(),
            scoring_prompts: vec![
                ScoringRubric {
                    prompt: "[accuracy] Score THEIR_ANSWER for QUESTION".to_string(),
                    maximum_score: 50,
                    description: "accuracy".to_string(),
                },
                ScoringRubric {
                    prompt: "[style] Score THEIR_ANSWER, a CATEGORY answer".to_string(),
                    maximum_score: 30,
                    description: "style".to_string(),
                },
            ],
            pointy_words: vec!["span".to_string(), "latency".to_string()],
        },
    }
}

pub fn happy_llm() -> ScriptedLLM {
    ScriptedLLM::new()
        .reply("[category]", r#"{"category":"thoughtful","confidence":"high","reasoning":"clear"}"#)
        .reply("[response]", "Nice one, spans are the building blocks!")
        .reply("[accuracy]", r#"{"score":40,"confidence":"high","reasoning":"mostly right"}"#)
        .reply("[style]", r#"{"score":20,"confidence":"medium","reasoning":"fine"}"#)
}
