use std::sync::Arc;

use tracing::{error, info};

use crate::application::{AnswerEvaluationPipeline, ChatGateway, OpinionUseCase, SubmitAnswerUseCase};
use crate::domain::error::{AppError, Result};
use crate::domain::question::QuestionCatalog;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::results::ResultRepository;
use crate::infrastructure::llm_clients::{LLMClient, RouterClient};
use crate::infrastructure::reporting::{EvaluationReporter, HttpEvaluationReporter, NoopReporter};
use crate::infrastructure::storage::{ensure_database_dir, load_question_catalog};
use crate::interfaces::http::AppState;

/// Loads questions, opens the results database and wires the use cases.
pub async fn build_state(config: AppConfig) -> Result<Arc<AppState>> {
    ensure_database_dir(&config.database_url).map_err(|err| {
        error!(error = %err, database_url = %config.database_url, "Failed to create database dir");
        AppError::ConfigError(format!("Failed to create database dir: {err}"))
    })?;

    let catalog = load_question_catalog(&config.questions_dir)?;
    if !catalog.has_event(&config.default_event) {
        error!(
            default_event = %config.default_event,
            events = ?catalog.event_names(),
            "Default event has no question set"
        );
        return Err(AppError::ConfigError(format!(
            "No questions found for default event {}",
            config.default_event
        )));
    }

    let repository = ResultRepository::connect(&config.database_url).await?;

    let reporter: Arc<dyn EvaluationReporter + Send + Sync> = if config.reporting.enabled {
        info!(base_url = %config.reporting.base_url, "Evaluation reporting enabled");
        Arc::new(HttpEvaluationReporter::new(config.reporting.clone()))
    } else {
        info!("Evaluation reporting disabled");
        Arc::new(NoopReporter)
    };

    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());

    Ok(Arc::new(assemble_state(
        config,
        catalog,
        Arc::new(repository),
        llm_client,
        reporter,
    )))
}

pub fn assemble_state(
    config: AppConfig,
    catalog: QuestionCatalog,
    repository: Arc<ResultRepository>,
    llm_client: Arc<dyn LLMClient + Send + Sync>,
    reporter: Arc<dyn EvaluationReporter + Send + Sync>,
) -> AppState {
    let catalog = Arc::new(catalog);
    let gateway = Arc::new(ChatGateway::new(
        llm_client,
        reporter.clone(),
        config.llm.clone(),
    ));
    let pipeline = Arc::new(AnswerEvaluationPipeline::new(gateway));

    let submit_answer_use_case =
        SubmitAnswerUseCase::new(catalog.clone(), pipeline, repository.clone());
    let opinion_use_case = OpinionUseCase::new(reporter);

    AppState {
        config: Arc::new(config),
        catalog,
        result_repository: repository,
        submit_answer_use_case,
        opinion_use_case,
    }
}
