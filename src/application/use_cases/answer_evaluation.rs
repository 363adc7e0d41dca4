use crate::application::use_cases::chat_gateway::ChatGateway;
use crate::application::use_cases::llm_output::parse_category_reply;
use crate::application::use_cases::score_aggregator::ScoreAggregator;
use crate::domain::chat::ReplyMode;
use crate::domain::error::Result;
use crate::domain::question::QuestionDefinition;
use crate::domain::score::ScoreResult;
use crate::domain::substitution::SubstitutionSet;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EvaluationResult {
    pub response: String,
    pub score: i64,
    pub possible_score: i64,
    /// Evaluation id of the response exchange.
    pub evaluation_id: String,
    pub category: String,
    pub breakdown: ScoreResult,
}

/// Category, then response and scoring side by side.
pub struct AnswerEvaluationPipeline {
    gateway: Arc<ChatGateway>,
    scorer: ScoreAggregator,
}

impl AnswerEvaluationPipeline {
    pub fn new(gateway: Arc<ChatGateway>) -> Self {
        Self {
            scorer: ScoreAggregator::new(gateway.clone()),
            gateway,
        }
    }

    #[instrument(skip_all, fields(question_id = %question.id))]
    pub async fn evaluate(
        &self,
        question: &QuestionDefinition,
        answer: &str,
    ) -> Result<EvaluationResult> {
        let substitutions = SubstitutionSet::new(answer, question.question.as_str());

        let category_reply = self
            .gateway
            .chat(
                answer,
                &question.prompts.category_prompt,
                &substitutions,
                ReplyMode::Structured,
            )
            .await?;
        let category = parse_category_reply(&category_reply.content)?.category;
        debug!(category = %category, "Answer categorized");

        let substitutions = substitutions.with_category(category.clone());

        // Dropping the pending branch on error cancels its backend calls.
        let (response, breakdown) = tokio::try_join!(
            self.gateway.chat(
                answer,
                &question.prompts.response_prompt,
                &substitutions,
                ReplyMode::FreeText,
            ),
            self.scorer.score(question, answer, &substitutions),
        )?;

        Ok(EvaluationResult {
            response: response.content,
            score: breakdown.achieved(),
            possible_score: breakdown.possible(),
            evaluation_id: response.evaluation_id,
            category,
            breakdown,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::test_support::{
        happy_llm, sample_question, RecordingReporter, ScriptedLLM,
    };
    use crate::domain::error::AppError;
    use crate::domain::llm_config::LLMConfig;
    use std::time::{Duration, Instant};

    fn pipeline(llm: ScriptedLLM) -> (AnswerEvaluationPipeline, Arc<ScriptedLLM>, Arc<RecordingReporter>) {
        let llm = Arc::new(llm);
        let reporter = Arc::new(RecordingReporter::default());
        let gateway = ChatGateway::new(llm.clone(), reporter.clone(), LLMConfig::default());
        (AnswerEvaluationPipeline::new(Arc::new(gateway)), llm, reporter)
    }

    #[tokio::test]
    async fn test_evaluate_happy_path() {
        let (pipeline, llm, reporter) = pipeline(happy_llm());
        let question = sample_question();

        let result = pipeline
            .evaluate(&question, "spans with latency numbers")
            .await
            .unwrap();

        assert_eq!(result.category, "thoughtful");
        assert_eq!(result.response, "Nice one, spans are the building blocks!");
        assert_eq!(result.score, 40 + 20 + 2);
        assert_eq!(result.possible_score, 50 + 30 + 2);
        assert_eq!(result.score, result.breakdown.achieved());

        let interactions = reporter.interactions.lock().unwrap();
        let response_id = interactions
            .iter()
            .find(|(_, record)| record.full_prompt.starts_with("[response]"))
            .map(|(id, _)| id.clone())
            .unwrap();
        assert_eq!(result.evaluation_id, response_id);
        assert_eq!(llm.prompts().len(), 4);
    }

    #[tokio::test]
    async fn test_category_reaches_response_prompt() {
        let (pipeline, llm, _) = pipeline(happy_llm());
        pipeline.evaluate(&sample_question(), "a").await.unwrap();

        let prompts = llm.prompts();
        assert!(prompts[0].starts_with("[category]"));
        assert!(prompts[0].contains("What is a trace?"));
        let response_prompt = prompts
            .iter()
            .find(|p| p.starts_with("[response]"))
            .unwrap();
        assert_eq!(response_prompt, "[response] Reply in a thoughtful way to a");
    }

    #[tokio::test]
    async fn test_unparseable_category_stops_pipeline() {
        let (pipeline, llm, _) = pipeline(
            ScriptedLLM::new()
                .reply("[category]", "definitely thoughtful")
                .reply("[response]", "never sent"),
        );

        let err = pipeline.evaluate(&sample_question(), "a").await.unwrap_err();
        assert!(matches!(err, AppError::CategoryParseError(_)));
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_score_fails_evaluation() {
        let (pipeline, _, _) = pipeline(
            ScriptedLLM::new()
                .reply("[category]", r#"{"category":"terse"}"#)
                .reply("[response]", "ok")
                .reply("[accuracy]", "fifty"),
        );

        let err = pipeline.evaluate(&sample_question(), "a").await.unwrap_err();
        assert!(matches!(err, AppError::ScoreParseError(_)));
    }

    #[tokio::test]
    async fn test_response_failure_fails_evaluation() {
        let (pipeline, _, _) = pipeline(
            ScriptedLLM::new()
                .reply("[category]", r#"{"category":"terse"}"#)
                .fail("[response]")
                .reply("[accuracy]", r#"{"score":1}"#)
                .reply("[style]", r#"{"score":1}"#),
        );

        let err = pipeline.evaluate(&sample_question(), "a").await.unwrap_err();
        assert!(matches!(err, AppError::BackendUnreachable(_)));
    }

    #[tokio::test]
    async fn test_response_and_scoring_overlap() {
        let (pipeline, _, _) = pipeline(happy_llm().with_delay(Duration::from_millis(100)));
        let question = sample_question();

        let started = Instant::now();
        pipeline.evaluate(&question, "a").await.unwrap();

        // Sequentially this is four delayed calls; overlapped it is three.
        assert!(started.elapsed() < Duration::from_millis(380));
    }
}
