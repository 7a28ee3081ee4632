//! AgentDesk API server binary.
//!
//! Wires the `PostgreSQL` store into the HTTP application and serves it
//! until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize structured logging (tracing)
//! 3. Connect the `PostgreSQL` pool
//! 4. Build the shared application state
//! 5. Serve HTTP (and the chat `WebSocket`, if enabled)
//! 6. Close the pool on shutdown

mod config;
mod error;

use std::sync::Arc;

use agentdesk_api::{start_server, AppState};
use agentdesk_db::PostgresPool;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat};
use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the database is
/// unreachable, or the server cannot bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    info!(
        host = config.host,
        port = config.port,
        db_max_connections = config.db_max_connections,
        chat_ws_enabled = config.chat_ws_enabled,
        "agentdesk-server starting"
    );

    run(&config).await?;

    info!("agentdesk-server stopped");
    Ok(())
}

async fn run(config: &AppConfig) -> Result<(), AppError> {
    let pool = PostgresPool::connect(&config.postgres()).await?;

    let state = AppState::new(Arc::new(pool.clone())).with_chat(config.chat_ws_enabled);
    let served = start_server(&config.server(), state).await;

    pool.close().await;
    served?;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
