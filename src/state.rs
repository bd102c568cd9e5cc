use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::cases::{CaseSource, DomainPolicy};
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::platform::{Connector, MessagingPlatform};
use crate::webhook::ensure_webhook;

/// Shown instead of the access token in every config read.
pub const REDACTED: &str = "REDACTED";

/// A live connection to the platform under one set of credentials.
/// The token itself stays inside the platform client.
pub struct Session {
    pub email: String,
    pub platform: Arc<dyn MessagingPlatform>,
    pub webhook_id: String,
}

/// What `GET /config` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    #[serde(rename = "SPARK_BOT_EMAIL")]
    pub email: Option<String>,
    #[serde(rename = "SPARK_BOT_TOKEN")]
    pub token: &'static str,
    #[serde(rename = "SPARK_BOT_URL")]
    pub public_url: String,
    #[serde(rename = "SPARK_BOT_APP_NAME")]
    pub app_name: String,
}

/// Process-wide bot state. Without a session the bot is "not ready".
pub struct BotState {
    public_url: String,
    app_name: String,
    connector: Arc<dyn Connector>,
    dispatcher: Dispatcher,
    session: RwLock<Option<Arc<Session>>>,
    /// Held for a whole `configure` so webhook lookup and creation never interleave
    configure_lock: Mutex<()>,
}

impl BotState {
    pub fn new(config: &Config, connector: Arc<dyn Connector>, cases: Arc<dyn CaseSource>) -> Self {
        let dispatcher = Dispatcher::new(
            cases,
            DomainPolicy::new(&config.cases.allowed_domain),
            config.bot.feedback_room.clone(),
        );
        Self {
            public_url: config.bot.public_url.clone(),
            app_name: config.bot.app_name.clone(),
            connector,
            dispatcher,
            session: RwLock::new(None),
            configure_lock: Mutex::new(()),
        }
    }

    /// Connect with new credentials and (re-)register the webhook. The
    /// previous session stays in place if anything fails.
    pub async fn configure(&self, email: &str, token: &str) -> Result<ConfigSnapshot> {
        let _guard = self.configure_lock.lock().await;

        info!("Bot Email: {}", email);
        info!("Token: {}", REDACTED);

        let platform = self
            .connector
            .connect(token)
            .context("Failed to connect to messaging platform")?;

        info!("Configuring Webhook.");
        let webhook = ensure_webhook(platform.as_ref(), &self.app_name, &self.public_url).await?;
        info!("Webhook ID: {}", webhook.id);

        let session = Session {
            email: email.to_string(),
            platform,
            webhook_id: webhook.id,
        };
        *self.session.write().await = Some(Arc::new(session));

        Ok(self.snapshot().await)
    }

    pub async fn snapshot(&self) -> ConfigSnapshot {
        let email = self.session.read().await.as_ref().map(|s| s.email.clone());
        ConfigSnapshot {
            email,
            token: REDACTED,
            public_url: self.public_url.clone(),
            app_name: self.app_name.clone(),
        }
    }

    /// The current session, or `None` while not ready.
    pub async fn session(&self) -> Option<Arc<Session>> {
        self.session.read().await.clone()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
