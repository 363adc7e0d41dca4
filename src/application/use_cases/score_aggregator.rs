use crate::application::use_cases::chat_gateway::ChatGateway;
use crate::application::use_cases::llm_output::parse_score_reply;
use crate::domain::chat::ReplyMode;
use crate::domain::error::Result;
use crate::domain::question::QuestionDefinition;
use crate::domain::score::{PartialScore, ScoreResult};
use crate::domain::substitution::SubstitutionSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct ScoreAggregator {
    gateway: Arc<ChatGateway>,
}

impl ScoreAggregator {
    pub fn new(gateway: Arc<ChatGateway>) -> Self {
        Self { gateway }
    }

    /// Scores every rubric in order, then the pointy-word rubric. Any reply
    /// that doesn't parse fails the whole score.
    #[instrument(skip_all, fields(question_id = %question.id))]
    pub async fn score(
        &self,
        question: &QuestionDefinition,
        answer: &str,
        substitutions: &SubstitutionSet,
    ) -> Result<ScoreResult> {
        let mut result = ScoreResult::new();

        for rubric in question.scoring_rubrics() {
            let reply = self
                .gateway
                .chat(answer, &rubric.prompt, substitutions, ReplyMode::Structured)
                .await?;
            let parsed = parse_score_reply(&reply.content)?;

            let part = PartialScore::new(rubric.maximum_score, parsed.score, parsed.reasoning);
            if part.out_of_range {
                warn!(
                    rubric = %rubric.description,
                    achieved = part.achieved,
                    possible = part.possible,
                    "Model score outside rubric range"
                );
            }
            result.push(part)?;
        }

        result.push(pointy_word_score(question.pointy_words(), answer))?;

        info!(
            achieved = result.achieved(),
            possible = result.possible(),
            "Answer scored"
        );
        Ok(result)
    }
}

/// One point per pointy word found verbatim in the answer.
pub fn pointy_word_score(pointy_words: &[String], answer: &str) -> PartialScore {
    let found: Vec<&str> = pointy_words
        .iter()
        .filter(|word| answer.contains(word.as_str()))
        .map(|word| word.as_str())
        .collect();

    let reasoning = if found.is_empty() {
        "No pointy words found".to_string()
    } else {
        format!("Found pointy words: {}", found.join(", "))
    };
    PartialScore::new(pointy_words.len() as i64, found.len() as i64, reasoning)
}
