//! Evaluation-reporting sink.
//!
//! Every backend exchange is forwarded to an external evaluation service so
//! attendees' reactions (opinions) can later be attached to it. The
//! evaluation id is minted locally before the report is sent, which keeps it
//! usable even when the sink is down.

use crate::domain::error::{AppError, Result};
use crate::domain::opinion::{Annotation, OpinionReported};
use crate::infrastructure::config::ReportingConfig;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// What gets reported about one backend exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub full_prompt: String,
    pub input: String,
    pub output: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub model: String,
}

#[async_trait]
pub trait EvaluationReporter {
    fn new_evaluation_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    async fn report_interaction(&self, evaluation_id: &str, record: &InteractionRecord)
        -> Result<()>;

    async fn report_opinion(
        &self,
        evaluation_id: &str,
        annotation: Annotation,
    ) -> Result<OpinionReported>;
}

/// Used when reporting is switched off.
pub struct NoopReporter;

#[async_trait]
impl EvaluationReporter for NoopReporter {
    async fn report_interaction(
        &self,
        evaluation_id: &str,
        _record: &InteractionRecord,
    ) -> Result<()> {
        debug!(evaluation_id, "reporting disabled, interaction not sent");
        Ok(())
    }

    async fn report_opinion(
        &self,
        _evaluation_id: &str,
        _annotation: Annotation,
    ) -> Result<OpinionReported> {
        Ok(OpinionReported {
            reported: false,
            success: true,
            message: String::new(),
        })
    }
}

#[derive(Serialize)]
struct CreateInteractions<'a> {
    app_name: &'a str,
    version_name: &'a str,
    env_type: &'a str,
    interactions: Vec<Interaction<'a>>,
}

#[derive(Serialize)]
struct Interaction<'a> {
    user_interaction_id: &'a str,
    full_prompt: &'a str,
    input: &'a str,
    output: &'a str,
    raw_json_data: serde_json::Value,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    custom_props: HashMap<&'static str, String>,
}

pub struct HttpEvaluationReporter {
    client: reqwest::Client,
    config: ReportingConfig,
}

impl HttpEvaluationReporter {
    pub fn new(config: ReportingConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            config,
        }
    }

    fn url(&self, relative: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), relative)
    }

    fn interactions_payload<'a>(
        &'a self,
        evaluation_id: &'a str,
        record: &'a InteractionRecord,
    ) -> CreateInteractions<'a> {
        let mut custom_props = HashMap::new();
        custom_props.insert("Environment", self.config.env_type.clone());
        custom_props.insert("Model", record.model.clone());

        CreateInteractions {
            app_name: &self.config.app_name,
            version_name: &self.config.app_version,
            env_type: &self.config.env_type,
            interactions: vec![Interaction {
                user_interaction_id: evaluation_id,
                full_prompt: &record.full_prompt,
                input: &record.input,
                output: &record.output,
                raw_json_data: json!({}),
                started_at: record.started_at,
                finished_at: record.finished_at,
                custom_props,
            }],
        }
    }

    async fn send(&self, method: reqwest::Method, relative: &str, body: serde_json::Value) -> Result<String> {
        let mut request = self
            .client
            .request(method, self.url(relative))
            .header("accept", "application/json")
            .json(&body);
        if let Some(api_key) = &self.config.api_key {
            request = request.header("Authorization", format!("Basic {}", api_key));
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Reporting request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "Reporting API error ({}): {}",
                status, text
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl EvaluationReporter for HttpEvaluationReporter {
    async fn report_interaction(
        &self,
        evaluation_id: &str,
        record: &InteractionRecord,
    ) -> Result<()> {
        let payload = serde_json::to_value(self.interactions_payload(evaluation_id, record))
            .map_err(|e| AppError::Internal(format!("Failed to encode interaction: {}", e)))?;
        self.send(reqwest::Method::POST, "interactions", payload).await?;
        debug!(evaluation_id, "interaction reported");
        Ok(())
    }

    async fn report_opinion(
        &self,
        evaluation_id: &str,
        annotation: Annotation,
    ) -> Result<OpinionReported> {
        let relative = format!(
            "application_versions/{}/interactions/{}",
            self.config.app_version, evaluation_id
        );
        match self
            .send(reqwest::Method::PUT, &relative, json!({ "annotation": annotation }))
            .await
        {
            Ok(message) => Ok(OpinionReported {
                reported: true,
                success: true,
                message,
            }),
            Err(err) => Ok(OpinionReported {
                reported: true,
                success: false,
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InteractionRecord {
        InteractionRecord {
            full_prompt: "Categorize: tracing".to_string(),
            input: "tracing".to_string(),
            output: "{\"category\":\"observability\"}".to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            model: "gpt-3.5-turbo-1106".to_string(),
        }
    }

    #[test]
    fn test_interactions_payload_shape() {
        let reporter = HttpEvaluationReporter::new(ReportingConfig {
            enabled: true,
            env_type: "PROD".to_string(),
            ..ReportingConfig::default()
        });
        let record = record();
        let value = serde_json::to_value(reporter.interactions_payload("eval-1", &record)).unwrap();

        assert_eq!(value["env_type"], "PROD");
        assert_eq!(value["interactions"][0]["user_interaction_id"], "eval-1");
        assert_eq!(value["interactions"][0]["input"], "tracing");
        assert_eq!(value["interactions"][0]["custom_props"]["Model"], "gpt-3.5-turbo-1106");
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let reporter = HttpEvaluationReporter::new(ReportingConfig {
            base_url: "https://reports.example.com/api/v1/".to_string(),
            ..ReportingConfig::default()
        });
        assert_eq!(
            reporter.url("interactions"),
            "https://reports.example.com/api/v1/interactions"
        );
    }

    #[tokio::test]
    async fn test_noop_reporter_mints_distinct_ids() {
        let reporter = NoopReporter;
        let first = reporter.new_evaluation_id();
        let second = reporter.new_evaluation_id();
        assert_ne!(first, second);
        assert!(reporter.report_interaction(&first, &record()).await.is_ok());

        let opinion = reporter.report_opinion(&first, Annotation::Good).await.unwrap();
        assert!(!opinion.reported);
        assert!(opinion.success);
    }
}
