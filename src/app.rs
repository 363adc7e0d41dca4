use std::error::Error;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::infrastructure::bootstrap::build_state;
use crate::infrastructure::config::AppConfig;
use crate::interfaces::http::start_server;

pub fn run() -> Result<(), Box<dyn Error>> {
    let _ = dotenvy::dotenv();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let config = AppConfig::load().map_err(|err| {
        error!(error = %err, "Failed to load configuration");
        err
    })?;
    info!(
        provider = ?config.llm.provider,
        model = %config.llm.model,
        default_event = %config.default_event,
        timeout_secs = config.request_timeout_secs,
        "Configuration loaded"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let state = build_state(config).await?;
        let server = start_server(state)?;
        server.await?;
        info!("HTTP server stopped");
        Ok::<(), Box<dyn Error>>(())
    })
}
