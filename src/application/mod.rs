pub mod use_cases;

pub use use_cases::answer_evaluation::{AnswerEvaluationPipeline, EvaluationResult};
pub use use_cases::chat_gateway::ChatGateway;
pub use use_cases::opinion::OpinionUseCase;
pub use use_cases::score_aggregator::ScoreAggregator;
pub use use_cases::submit_answer::SubmitAnswerUseCase;
