use serde::{Deserialize, Serialize};

/// How the backend is asked to shape its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyMode {
    /// JSON object mode.
    Structured,
    FreeText,
}

impl ReplyMode {
    pub fn is_structured(self) -> bool {
        matches!(self, ReplyMode::Structured)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatResult {
    pub content: String,
    pub evaluation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryReply {
    pub category: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreReply {
    pub score: i64,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub reasoning: String,
}
