use crate::domain::chat::{CategoryReply, ScoreReply};
use crate::domain::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").unwrap());

/// Strips a surrounding markdown code fence, which some backends add even in
/// JSON mode.
pub(crate) fn strip_code_fence(output: &str) -> &str {
    let trimmed = output.trim();
    CODE_FENCE_PATTERN
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str())
        .unwrap_or(trimmed)
}

pub fn parse_category_reply(output: &str) -> Result<CategoryReply> {
    serde_json::from_str(strip_code_fence(output))
        .map_err(|e| AppError::CategoryParseError(format!("{e}; reply was: {}", preview(output))))
}

pub fn parse_score_reply(output: &str) -> Result<ScoreReply> {
    serde_json::from_str(strip_code_fence(output))
        .map_err(|e| AppError::ScoreParseError(format!("{e}; reply was: {}", preview(output))))
}

fn preview(output: &str) -> String {
    const MAX_CHARS: usize = 200;
    let mut preview: String = output.chars().take(MAX_CHARS).collect();
    if output.chars().count() > MAX_CHARS {
        preview.push_str("...");
    }
    preview
}
