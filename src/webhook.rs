use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::platform::{MessagingPlatform, Webhook};

const RESOURCE: &str = "messages";
const EVENT: &str = "created";

/// Point the webhook named `name` at `target_url`, creating it if needed.
/// A failed listing is treated as "no webhook yet".
pub async fn ensure_webhook(
    platform: &dyn MessagingPlatform,
    name: &str,
    target_url: &str,
) -> Result<Webhook> {
    let existing = match platform.list_webhooks().await {
        Ok(hooks) => hooks.into_iter().find(|h| h.name == name),
        Err(e) => {
            warn!("Failed to list webhooks, will create one: {:#}", e);
            None
        }
    };

    if let Some(hook) = existing {
        info!("Found existing webhook.  Updating it.");
        return platform
            .update_webhook(&hook.id, name, target_url)
            .await
            .with_context(|| format!("Failed to update webhook {}", hook.id));
    }

    info!("Creating new webhook.");
    platform
        .create_webhook(name, target_url, RESOURCE, EVENT)
        .await
        .context("Failed to create webhook")
}
