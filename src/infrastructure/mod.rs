pub mod bootstrap;
pub mod config;
pub mod db;
pub mod llm_clients;
pub mod reporting;
pub mod storage;
