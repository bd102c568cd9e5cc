use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::platform::webex::DEFAULT_API_BASE;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cases: CasesConfig,
    #[serde(default)]
    pub webex: WebexConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotConfig {
    /// Bot account email; may be supplied later through `POST /config`
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    /// Public address Webex delivers webhooks to
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub app_name: String,
    /// Room that receives `/feedback` submissions
    #[serde(default)]
    pub feedback_room: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CasesConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_allowed_domain")]
    pub allowed_domain: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebexConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_allowed_domain() -> String {
    "cisco.com".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CasesConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            allowed_domain: default_allowed_domain(),
        }
    }
}

impl Default for WebexConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML")
    }

    /// Override fields from environment-style lookups. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SPARK_BOT_EMAIL") {
            self.bot.email = Some(v);
        }
        if let Some(v) = get("SPARK_BOT_TOKEN") {
            self.bot.token = Some(v);
        }
        if let Some(v) = get("SPARK_BOT_URL") {
            self.bot.public_url = v;
        }
        if let Some(v) = get("SPARK_BOT_APP_NAME") {
            self.bot.app_name = v;
        }
        if let Some(v) = get("FEEDBACK_ROOM") {
            self.bot.feedback_room = Some(v);
        }
        if let Some(v) = get("CASE_API_URL") {
            self.cases.base_url = v;
        }
        if let Some(v) = get("CASE_API_TOKEN") {
            self.cases.token = v;
        }
        if let Some(v) = get("CASE_ALLOWED_DOMAIN") {
            self.cases.allowed_domain = v;
        }
        if let Some(v) = get("WEBEX_API_URL") {
            self.webex.api_base = v;
        }
        if let Some(v) = get("BIND_ADDRESS") {
            self.server.host = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = v
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT value: {}", v))?;
        }
        Ok(())
    }

    /// The public URL and app name are required for webhook registration.
    pub fn validate(&self) -> Result<()> {
        if self.bot.public_url.trim().is_empty() || self.bot.app_name.trim().is_empty() {
            anyhow::bail!(
                "Missing required argument.  Must set 'SPARK_BOT_URL' and 'SPARK_BOT_APP_NAME' in ENV."
            );
        }
        Ok(())
    }

    /// Email and token from startup, if both were given
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.bot.email, &self.bot.token) {
            (Some(email), Some(token)) if !email.is_empty() && !token.is_empty() => {
                Some((email.clone(), token.clone()))
            }
            _ => None,
        }
    }
}
