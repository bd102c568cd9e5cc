mod cases;
mod commands;
mod config;
mod dispatch;
mod parse;
mod platform;
mod rooms;
mod server;
mod state;
mod webhook;

#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cases::CaseApiClient;
use crate::config::Config;
use crate::platform::webex::WebexConnector;
use crate::state::BotState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,casebot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Bot URL (for webhook): {}", config.bot.public_url);
    info!("Bot App Name: {}", config.bot.app_name);
    if config.cases.base_url.is_empty() {
        warn!("CASE_API_URL is not set; case commands will fail");
    }

    let connector = Arc::new(WebexConnector::new(&config.webex.api_base));
    let cases = Arc::new(CaseApiClient::new(&config.cases));
    let state = Arc::new(BotState::new(&config, connector, cases));

    match config.credentials() {
        Some((email, token)) => {
            state.configure(&email, &token).await?;
        }
        None => warn!("Bot config is missing, please provide via API.  Bot not ready."),
    }

    server::serve(state, &config.server.host, config.server.port).await
}
