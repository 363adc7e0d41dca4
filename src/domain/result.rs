use serde::{Deserialize, Serialize};

pub const RESULT_TYPE: &str = "result";
pub const SUMMARY_TYPE: &str = "summary";

/// One answered question. Written once, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerResult {
    #[serde(rename = "quiz_run_id")]
    pub execution_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub event_name: String,
    pub question_id: String,
    pub answer: String,
    pub trace_id: String,
    pub score: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Running total for one execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultSummary {
    #[serde(rename = "quiz_run_id")]
    pub execution_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub event_name: String,
    pub total_score: i64,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Outcome of persisting an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultWrite {
    Recorded,
    /// The result row was written but the summary increment failed.
    RecordedWithoutSummary,
    /// An answer for this question already exists for the execution.
    Duplicate,
}
