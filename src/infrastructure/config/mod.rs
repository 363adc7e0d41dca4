use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE: &str = "quizbooth.toml";
pub const ENV_PREFIX: &str = "QUIZBOOTH_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<String>,
    pub app_name: String,
    pub app_version: String,
    pub env_type: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://app.llm.deepchecks.com/api/v1".to_string(),
            api_key: None,
            app_name: "Booth Game Quiz".to_string(),
            app_version: "alpha".to_string(),
            env_type: "PROD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub request_timeout_secs: u64,
    pub default_event: String,
    pub questions_dir: PathBuf,
    pub database_url: String,
    pub llm: LLMConfig,
    pub reporting: ReportingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            request_timeout_secs: 30,
            default_event: "devopsdays_whenever".to_string(),
            questions_dir: PathBuf::from("questions"),
            database_url: "sqlite://quizbooth.db".to_string(),
            llm: LLMConfig::default(),
            reporting: ReportingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `quizbooth.toml`, then `QUIZBOOTH_*` variables
    /// (`__` separates nested keys). A bare `OPENAI_API_KEY` fills the
    /// backend key when nothing more specific is set.
    pub fn load() -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|_| "llm.api_key".into()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.default_event.trim().is_empty() {
            return Err(AppError::ConfigError("default_event is required".to_string()));
        }
        if self.reporting.enabled && self.reporting.base_url.trim().is_empty() {
            return Err(AppError::ConfigError(
                "reporting.base_url is required when reporting is enabled".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
