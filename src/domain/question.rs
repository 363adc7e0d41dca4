use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoringRubric {
    pub prompt: String,
    pub maximum_score: i64,
    #[serde(default)]
    pub description: String,
}

/// Prompt set for one question: category first, then response and rubrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPrompts {
    pub category_prompt: String,
    pub response_prompt: String,
    #[serde(default)]
    pub scoring_prompts: Vec<ScoringRubric>,
    #[serde(default)]
    pub pointy_words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionDefinition {
    pub id: String,
    pub question: String,
    #[serde(default)]
    pub version: String,
    pub prompts: QuestionPrompts,
}

impl QuestionDefinition {
    pub fn scoring_rubrics(&self) -> &[ScoringRubric] {
        &self.prompts.scoring_prompts
    }

    pub fn pointy_words(&self) -> &[String] {
        &self.prompts.pointy_words
    }

    pub fn summary(&self) -> QuestionSummary {
        QuestionSummary {
            id: self.id.clone(),
            question: self.question.clone(),
            version: self.version.clone(),
        }
    }
}

/// What attendees get to see of a question; prompts stay server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionSummary {
    pub id: String,
    pub question: String,
    pub version: String,
}

/// All question sets, keyed by event name. Built once at startup and then
/// only read.
#[derive(Debug, Clone, Default)]
pub struct QuestionCatalog {
    events: BTreeMap<String, Vec<QuestionDefinition>>,
}

impl QuestionCatalog {
    pub fn new(events: BTreeMap<String, Vec<QuestionDefinition>>) -> Self {
        Self { events }
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.keys().cloned().collect()
    }

    pub fn has_event(&self, event_name: &str) -> bool {
        self.events.contains_key(event_name)
    }

    pub fn questions(&self, event_name: &str) -> Option<&[QuestionDefinition]> {
        self.events.get(event_name).map(|questions| questions.as_slice())
    }

    pub fn find(&self, event_name: &str, question_id: &str) -> Option<&QuestionDefinition> {
        self.events
            .get(event_name)?
            .iter()
            .find(|question| question.id == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": "5f0b3a8e-8a0c-4c50-9d4c-4d3f1f1c9a11",
            "question": "What is a trace?",
            "version": "2",
            "prompts": {
                "categoryPrompt": "Categorize: THEIR_ANSWER",
                "responsePrompt": "Respond to CATEGORY answer: THEIR_ANSWER",
                "scoringPrompts": [
                    { "prompt": "Score QUESTION / THEIR_ANSWER", "maximumScore": 50, "description": "accuracy" }
                ],
                "pointyWords": ["span", "trace"]
            }
        }
    ]"#;

    #[test]
    fn test_parse_question_file() {
        let questions: Vec<QuestionDefinition> = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(questions.len(), 1);
        let question = &questions[0];
        assert_eq!(question.scoring_rubrics()[0].maximum_score, 50);
        assert_eq!(question.pointy_words(), &["span".to_string(), "trace".to_string()]);
    }

    #[test]
    fn test_catalog_lookup() {
        let questions: Vec<QuestionDefinition> = serde_json::from_str(SAMPLE).unwrap();
        let mut events = BTreeMap::new();
        events.insert("kubecon".to_string(), questions);
        let catalog = QuestionCatalog::new(events);

        assert!(catalog.has_event("kubecon"));
        assert!(!catalog.has_event("other"));
        assert!(catalog
            .find("kubecon", "5f0b3a8e-8a0c-4c50-9d4c-4d3f1f1c9a11")
            .is_some());
        assert!(catalog.find("kubecon", "missing").is_none());
        assert!(catalog.find("other", "5f0b3a8e-8a0c-4c50-9d4c-4d3f1f1c9a11").is_none());
    }

    #[test]
    fn test_rubrics_and_pointy_words_default_to_empty() {
        let json = r#"{
            "id": "q1",
            "question": "Why?",
            "prompts": { "categoryPrompt": "c", "responsePrompt": "r" }
        }"#;
        let question: QuestionDefinition = serde_json::from_str(json).unwrap();
        assert!(question.scoring_rubrics().is_empty());
        assert!(question.pointy_words().is_empty());
    }
}
