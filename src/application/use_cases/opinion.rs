use crate::domain::error::{AppError, Result};
use crate::domain::opinion::{Annotation, OpinionFeedback, OpinionReported, OpinionSubmission};
use crate::infrastructure::reporting::EvaluationReporter;
use std::sync::Arc;
use tracing::{info, warn};

/// Attaches an attendee's reaction to an earlier evaluation. Sink failures
/// come back as `success: false` instead of an error.
pub struct OpinionUseCase {
    reporter: Arc<dyn EvaluationReporter + Send + Sync>,
}

impl OpinionUseCase {
    pub fn new(reporter: Arc<dyn EvaluationReporter + Send + Sync>) -> Self {
        Self { reporter }
    }

    pub async fn execute(&self, submission: OpinionSubmission) -> Result<OpinionFeedback> {
        let evaluation_id = submission.evaluation_id.trim();
        if evaluation_id.is_empty() {
            return Err(AppError::ValidationError(
                "evaluation_id is required".to_string(),
            ));
        }

        let annotation = Annotation::from_opinion(&submission.opinion);
        let reported = match self.reporter.report_opinion(evaluation_id, annotation).await {
            Ok(reported) => reported,
            Err(err) => {
                warn!(evaluation_id, error = %err, "Failed to report opinion");
                OpinionReported {
                    reported: true,
                    success: false,
                    message: "Could not report opinion".to_string(),
                }
            }
        };

        info!(
            evaluation_id,
            opinion = %submission.opinion,
            annotation = ?annotation,
            success = reported.success,
            "Opinion received"
        );

        Ok(OpinionFeedback {
            evaluation_id: evaluation_id.to_string(),
            opinion: submission.opinion,
            annotation,
            reported: reported.reported,
            success: reported.success,
            message: reported.message,
        })
    }
}
