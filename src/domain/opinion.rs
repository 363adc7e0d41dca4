use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Annotation {
    Good,
    Bad,
    Unknown,
}

impl Annotation {
    /// Maps an attendee's reaction onto the reporting sink's annotation.
    pub fn from_opinion(opinion: &str) -> Self {
        match opinion {
            "whoa" | "yeah" => Annotation::Good,
            "meh" => Annotation::Bad,
            _ => Annotation::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpinionSubmission {
    pub evaluation_id: String,
    pub opinion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpinionReported {
    pub reported: bool,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpinionFeedback {
    pub evaluation_id: String,
    pub opinion: String,
    pub annotation: Annotation,
    pub reported: bool,
    pub success: bool,
    pub message: String,
}
