use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AppError {
    Internal(String),
    ValidationError(String),
    QuestionNotFound(String),
    EventNotFound(String),
    AlreadyAnswered(String),
    BackendUnreachable(String),
    CategoryParseError(String),
    ScoreParseError(String),
    StorageError(String),
    Timeout(String),
    ConfigError(String),
}

impl AppError {
    /// HTTP status the interface layer answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::ValidationError(_) => 400,
            AppError::QuestionNotFound(_) | AppError::EventNotFound(_) => 404,
            AppError::AlreadyAnswered(_) => 409,
            AppError::Timeout(_) => 504,
            AppError::Internal(_)
            | AppError::BackendUnreachable(_)
            | AppError::CategoryParseError(_)
            | AppError::ScoreParseError(_)
            | AppError::StorageError(_)
            | AppError::ConfigError(_) => 500,
        }
    }

    /// Message safe to show to an attendee. Client errors keep their detail,
    /// server errors collapse to a fixed sentence.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::QuestionNotFound(msg)
            | AppError::EventNotFound(msg)
            | AppError::AlreadyAnswered(msg) => msg.clone(),
            AppError::BackendUnreachable(_) => "Could not reach LLM. No fallback in place".to_string(),
            AppError::CategoryParseError(_) => {
                "Could not parse category response. No fallback in place".to_string()
            }
            AppError::ScoreParseError(_) => {
                "Could not parse score response. No fallback in place".to_string()
            }
            AppError::StorageError(_) => "Could not read or write results".to_string(),
            AppError::Timeout(_) => "Evaluating the answer took too long".to_string(),
            AppError::ConfigError(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::QuestionNotFound(msg) => write!(f, "Question not found: {}", msg),
            AppError::EventNotFound(msg) => write!(f, "Event not found: {}", msg),
            AppError::AlreadyAnswered(msg) => write!(f, "Already answered: {}", msg),
            AppError::BackendUnreachable(msg) => write!(f, "Backend unreachable: {}", msg),
            AppError::CategoryParseError(msg) => write!(f, "Category parse error: {}", msg),
            AppError::ScoreParseError(msg) => write!(f, "Score parse error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            AppError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StorageError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
