pub mod answer_evaluation;
pub mod chat_gateway;
pub mod llm_output;
pub mod opinion;
pub mod prompt_engine;
pub mod score_aggregator;
pub mod submit_answer;

#[cfg(test)]
pub(crate) mod test_support;
