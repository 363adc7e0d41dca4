use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnswerSubmission {
    #[validate(length(min = 1, max = 4000))]
    pub answer: String,
}

/// Request-scoped identifiers that travel with a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionContext {
    pub event_name: String,
    pub execution_id: String,
    pub trace_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub response: String,
    pub score: i64,
    pub possible_score: i64,
    pub evaluation_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_answer_is_invalid() {
        let submission = AnswerSubmission {
            answer: String::new(),
        };
        assert!(submission.validate().is_err());
    }

    #[test]
    fn test_oversized_answer_is_invalid() {
        let submission = AnswerSubmission {
            answer: "x".repeat(4001),
        };
        assert!(submission.validate().is_err());
    }

    #[test]
    fn test_regular_answer_is_valid() {
        let submission = AnswerSubmission {
            answer: "Traces show the path of a request".to_string(),
        };
        assert!(submission.validate().is_ok());
    }
}
