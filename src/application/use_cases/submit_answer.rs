use crate::application::use_cases::answer_evaluation::AnswerEvaluationPipeline;
use crate::domain::answer::{AnswerFeedback, AnswerSubmission, SubmissionContext};
use crate::domain::error::{AppError, Result};
use crate::domain::question::QuestionCatalog;
use crate::domain::result::ResultWrite;
use crate::infrastructure::db::results::ResultRepository;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

pub struct SubmitAnswerUseCase {
    catalog: Arc<QuestionCatalog>,
    pipeline: Arc<AnswerEvaluationPipeline>,
    repository: Arc<ResultRepository>,
}

impl SubmitAnswerUseCase {
    pub fn new(
        catalog: Arc<QuestionCatalog>,
        pipeline: Arc<AnswerEvaluationPipeline>,
        repository: Arc<ResultRepository>,
    ) -> Self {
        Self {
            catalog,
            pipeline,
            repository,
        }
    }

    /// Evaluates the answer and records it under the execution. Nothing is
    /// written when the evaluation fails. A question already answered in the
    /// execution is rejected before the backend is called.
    #[instrument(skip_all, fields(
        event = %ctx.event_name,
        execution_id = %ctx.execution_id,
        trace_id = %ctx.trace_id,
        question_id = %question_id,
    ))]
    pub async fn execute(
        &self,
        ctx: &SubmissionContext,
        question_id: &str,
        submission: AnswerSubmission,
    ) -> Result<AnswerFeedback> {
        submission
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid answer: {e}")))?;

        if !self.catalog.has_event(&ctx.event_name) {
            return Err(AppError::EventNotFound(format!(
                "Unknown event: {}",
                ctx.event_name
            )));
        }
        let question = self
            .catalog
            .find(&ctx.event_name, question_id)
            .ok_or_else(|| {
                AppError::QuestionNotFound(format!(
                    "Question {question_id} not found for event {}",
                    ctx.event_name
                ))
            })?;

        if self
            .repository
            .has_result(&ctx.execution_id, question_id)
            .await?
        {
            warn!("Question already answered in this execution");
            return Err(already_answered(question_id));
        }

        let evaluation = self.pipeline.evaluate(question, &submission.answer).await?;

        let write = self
            .repository
            .add_result(
                &ctx.execution_id,
                &ctx.event_name,
                question_id,
                &submission.answer,
                &ctx.trace_id,
                evaluation.score,
            )
            .await?;
        match write {
            ResultWrite::Recorded => {}
            ResultWrite::RecordedWithoutSummary => {
                warn!("Result stored without summary update")
            }
            ResultWrite::Duplicate => {
                warn!("Question answered concurrently in this execution, keeping the first answer");
                return Err(already_answered(question_id));
            }
        }

        info!(
            score = evaluation.score,
            possible_score = evaluation.possible_score,
            category = %evaluation.category,
            "Answer evaluated"
        );

        Ok(AnswerFeedback {
            response: evaluation.response,
            score: evaluation.score,
            possible_score: evaluation.possible_score,
            evaluation_id: evaluation.evaluation_id,
        })
    }
}

fn already_answered(question_id: &str) -> AppError {
    AppError::AlreadyAnswered(format!(
        "Question {question_id} was already answered in this execution"
    ))
}
