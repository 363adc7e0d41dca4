pub mod answer;
pub mod chat;
pub mod error;
pub mod llm_config;
pub mod opinion;
pub mod question;
pub mod result;
pub mod score;
pub mod substitution;
