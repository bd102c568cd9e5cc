pub mod record;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::config::CasesConfig;
use crate::parse::CaseNumber;

pub use record::CaseRecord;
use record::CaseEnvelope;

/// Source of case details. Fetched fresh on every command.
#[async_trait]
pub trait CaseSource: Send + Sync {
    /// `Ok(None)` when the backend has no case with this number.
    async fn fetch_case(&self, number: &CaseNumber) -> Result<Option<CaseRecord>>;
}

/// HTTP client for the case-management API.
pub struct CaseApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl CaseApiClient {
    pub fn new(config: &CasesConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }
}

#[async_trait]
impl CaseSource for CaseApiClient {
    async fn fetch_case(&self, number: &CaseNumber) -> Result<Option<CaseRecord>> {
        let url = format!("{}/cases/{}", self.base_url, number);

        debug!("Fetching case details: {}", url);

        let mut request = self.client.get(&url);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to request case {}", number))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Case API error ({}): {}", status, error_body);
        }

        let envelope: CaseEnvelope = response
            .json()
            .await
            .context("Failed to parse case API response")?;

        Ok(envelope.into_record())
    }
}

/// Limits case data to senders whose email belongs to one domain.
#[derive(Debug, Clone)]
pub struct DomainPolicy {
    suffix: String,
}

impl DomainPolicy {
    pub fn new(domain: &str) -> Self {
        let domain = domain.trim().trim_start_matches('@').to_ascii_lowercase();
        Self {
            suffix: format!("@{}", domain),
        }
    }

    pub fn permits(&self, email: &str) -> bool {
        email.trim().to_ascii_lowercase().ends_with(&self.suffix)
    }
}
