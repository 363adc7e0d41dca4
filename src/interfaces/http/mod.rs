use crate::application::{OpinionUseCase, SubmitAnswerUseCase};
use crate::domain::answer::{AnswerSubmission, SubmissionContext};
use crate::domain::error::{AppError, Result};
use crate::domain::opinion::OpinionSubmission;
use crate::domain::question::{QuestionCatalog, QuestionSummary};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::results::ResultRepository;
use actix_cors::Cors;
use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const EVENT_NAME_HEADER: &str = "event-name";
pub const EXECUTION_ID_HEADER: &str = "execution-id";
pub const ATTENDEE_API_KEY_HEADER: &str = "x-attendee-api-key";
pub const TRACE_ID_HEADER: &str = "x-trace-id";
const TRACEPARENT_HEADER: &str = "traceparent";

pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<QuestionCatalog>,
    pub result_repository: Arc<ResultRepository>,
    pub submit_answer_use_case: SubmitAnswerUseCase,
    pub opinion_use_case: OpinionUseCase,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    trace_id: &'a str,
}

#[derive(Serialize)]
struct QuestionsResponse {
    question_set: String,
    questions: Vec<QuestionSummary>,
}

/// Per-request values taken from headers.
struct RequestMeta {
    trace_id: String,
    event_name: String,
    execution_id: Option<String>,
    attendee_api_key: Option<String>,
}

impl RequestMeta {
    fn from_request(req: &HttpRequest, default_event: &str) -> Self {
        Self {
            trace_id: request_trace_id(req),
            event_name: header_value(req, EVENT_NAME_HEADER)
                .unwrap_or_else(|| default_event.to_string()),
            execution_id: header_value(req, EXECUTION_ID_HEADER),
            attendee_api_key: header_value(req, ATTENDEE_API_KEY_HEADER),
        }
    }

    fn span(&self, req: &HttpRequest) -> tracing::Span {
        let attendee_api_key = self
            .attendee_api_key
            .as_deref()
            .map(mask_api_key)
            .unwrap_or_default();
        info_span!(
            "http_request",
            method = %req.method(),
            path = %req.path(),
            trace_id = %self.trace_id,
            event = %self.event_name,
            attendee_api_key = %attendee_api_key,
        )
    }

    fn require_execution_id(&self) -> Result<String> {
        self.execution_id.clone().ok_or_else(|| {
            AppError::ValidationError(format!("{EXECUTION_ID_HEADER} header is required"))
        })
    }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Reuses the trace id of an incoming W3C `traceparent`, otherwise starts a
/// new one.
fn request_trace_id(req: &HttpRequest) -> String {
    header_value(req, TRACEPARENT_HEADER)
        .and_then(|traceparent| {
            let trace_id = traceparent.split('-').nth(1)?;
            let valid = trace_id.len() == 32
                && trace_id.chars().all(|c| c.is_ascii_hexdigit())
                && trace_id.chars().any(|c| c != '0');
            valid.then(|| trace_id.to_ascii_lowercase())
        })
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

/// Keeps only the last four characters.
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

async fn with_timeout<T>(limit: Duration, work: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, work).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "request did not finish within {}s",
            limit.as_secs()
        ))),
    }
}

fn error_response(err: &AppError, trace_id: &str) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(trace_id, error = %err, status = status.as_u16(), "Request failed");
    } else {
        warn!(trace_id, error = %err, status = status.as_u16(), "Request rejected");
    }
    HttpResponse::build(status)
        .insert_header((TRACE_ID_HEADER, trace_id.to_string()))
        .json(ErrorBody {
            error: err.public_message(),
            trace_id,
        })
}

fn respond<T: Serialize>(result: Result<T>, trace_id: &str) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok()
            .insert_header((TRACE_ID_HEADER, trace_id.to_string()))
            .json(body),
        Err(err) => error_response(&err, trace_id),
    }
}

fn known_event(catalog: &QuestionCatalog, event_name: &str) -> Result<()> {
    if catalog.has_event(event_name) {
        Ok(())
    } else {
        Err(AppError::EventNotFound(format!("Unknown event: {event_name}")))
    }
}

/// Runs a handler body under the request span and timeout and shapes the
/// response.
async fn handle<T, F, Fut>(req: &HttpRequest, data: &AppState, work: F) -> HttpResponse
where
    T: Serialize,
    F: FnOnce(RequestMeta) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let meta = RequestMeta::from_request(req, &data.config.default_event);
    let trace_id = meta.trace_id.clone();
    let span = meta.span(req);
    let limit = data.config.request_timeout();

    let result = with_timeout(limit, work(meta)).instrument(span.clone()).await;
    let _entered = span.enter();
    respond(result, &trace_id)
}

#[get("/health")]
async fn health(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    handle(&req, &data, |_| async {
        Ok(serde_json::json!({ "status": "ok" }))
    })
    .await
}

#[get("/events")]
async fn list_events(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let catalog = data.catalog.clone();
    handle(&req, &data, |_| async move { Ok(catalog.event_names()) }).await
}

#[get("/questions")]
async fn list_questions(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let catalog = data.catalog.clone();
    handle(&req, &data, |meta| async move {
        let questions = catalog
            .questions(&meta.event_name)
            .ok_or_else(|| AppError::EventNotFound(format!("Unknown event: {}", meta.event_name)))?;
        Ok(QuestionsResponse {
            question_set: meta.event_name.clone(),
            questions: questions.iter().map(|q| q.summary()).collect(),
        })
    })
    .await
}

#[post("/questions/{question_id}/answer")]
async fn answer_question(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<AnswerSubmission>,
) -> HttpResponse {
    let question_id = path.into_inner();
    let submission = body.into_inner();
    let state = data.clone();
    handle(&req, &data, |meta| async move {
        let ctx = SubmissionContext {
            execution_id: meta.require_execution_id()?,
            event_name: meta.event_name,
            trace_id: meta.trace_id,
        };
        info!(question_id = %question_id, execution_id = %ctx.execution_id, "Answer received");
        state
            .submit_answer_use_case
            .execute(&ctx, &question_id, submission)
            .await
    })
    .await
}

#[get("/results")]
async fn execution_results(req: HttpRequest, data: web::Data<AppState>) -> HttpResponse {
    let repository = data.result_repository.clone();
    handle(&req, &data, |meta| async move {
        let execution_id = meta.require_execution_id()?;
        repository.get_execution_results(&execution_id).await
    })
    .await
}

#[get("/events/{event_name}/results")]
async fn event_results(
    req: HttpRequest,
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let event_name = path.into_inner();
    let catalog = data.catalog.clone();
    let repository = data.result_repository.clone();
    handle(&req, &data, |_| async move {
        known_event(&catalog, &event_name)?;
        repository.get_all_results_for_event(&event_name).await
    })
    .await
}

#[post("/opinion")]
async fn post_opinion(
    req: HttpRequest,
    data: web::Data<AppState>,
    body: web::Json<OpinionSubmission>,
) -> HttpResponse {
    let submission = body.into_inner();
    let state = data.clone();
    handle(&req, &data, |_| async move {
        state.opinion_use_case.execute(submission).await
    })
    .await
}

/// Malformed JSON bodies get the same envelope as every other error.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        let trace_id = request_trace_id(req);
        let app_err = AppError::ValidationError(format!("Invalid request body: {err}"));
        let response = error_response(&app_err, &trace_id);
        InternalError::from_response(err, response).into()
    })
}

/// Registers the `/api` scope. Shared by the server and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .service(health)
            .service(list_events)
            .service(list_questions)
            .service(answer_question)
            .service(execution_results)
            .service(event_results)
            .service(post_opinion),
    );
}

pub fn start_server(state: Arc<AppState>) -> std::io::Result<Server> {
    let host = state.config.server.host.clone();
    let port = state.config.server.port;
    let data = web::Data::from(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .app_data(data.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run();

    info!(%host, port, "HTTP server listening");
    Ok(server)
}
