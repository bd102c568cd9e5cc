pub mod webex;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The `data` block of a "message created" webhook. Only ids are carried;
/// the message itself has to be fetched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub id: String,
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub person_id: String,
}

/// A message fetched from the platform by id.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    pub id: String,
    pub room_id: String,
    pub person_id: String,
    pub person_email: String,
    /// The message text (empty for attachment-only messages)
    pub text: String,
}

/// A webhook subscription registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub target_url: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Everything the bot needs from the messaging platform.
#[async_trait]
pub trait MessagingPlatform: Send + Sync {
    async fn get_message(&self, message_id: &str) -> Result<IncomingMessage>;

    /// Emails of the account the bot is running as
    async fn me_emails(&self) -> Result<Vec<String>>;

    /// Primary email of a person, if the platform knows one
    async fn person_email(&self, person_id: &str) -> Result<Option<String>>;

    async fn find_person_id(&self, email: &str) -> Result<Option<String>>;

    async fn room_title(&self, room_id: &str) -> Result<String>;

    /// Group rooms the bot is a member of
    async fn list_rooms(&self) -> Result<Vec<Room>>;

    async fn create_room(&self, title: &str) -> Result<Room>;

    async fn is_member(&self, room_id: &str, email: &str) -> Result<bool>;

    /// Returns the membership id
    async fn add_member(&self, room_id: &str, person_id: &str) -> Result<String>;

    async fn send_to_room(&self, room_id: &str, markdown: &str) -> Result<()>;

    async fn send_to_email(&self, email: &str, markdown: &str) -> Result<()>;

    async fn list_webhooks(&self) -> Result<Vec<Webhook>>;

    async fn update_webhook(&self, webhook_id: &str, name: &str, target_url: &str)
        -> Result<Webhook>;

    async fn create_webhook(
        &self,
        name: &str,
        target_url: &str,
        resource: &str,
        event: &str,
    ) -> Result<Webhook>;
}

/// Builds a platform client for an access token.
pub trait Connector: Send + Sync {
    fn connect(&self, token: &str) -> Result<Arc<dyn MessagingPlatform>>;
}
