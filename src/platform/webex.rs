use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::{Connector, IncomingMessage, MessagingPlatform, Room, Webhook};

pub const DEFAULT_API_BASE: &str = "https://webexapis.com/v1";

/// Webex REST API client bound to one bot token.
pub struct WebexClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageDetail {
    id: String,
    room_id: String,
    #[serde(default)]
    person_id: String,
    #[serde(default)]
    person_email: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Person {
    id: String,
    #[serde(default)]
    emails: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Membership {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingMessage<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    room_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_person_email: Option<&'a str>,
    markdown: &'a str,
}

impl WebexClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("casebot/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build Webex HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Webex {} {}", method, url);
        self.client.request(method, url).bearer_auth(&self.token)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<T> {
        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to send Webex request: {}", what))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Webex API error ({}) on {}: {}", status, what, error_body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse Webex response: {}", what))
    }

    async fn send_message(&self, message: &OutgoingMessage<'_>) -> Result<()> {
        let _: serde_json::Value = self
            .send(
                self.request(Method::POST, "messages").json(message),
                "create message",
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MessagingPlatform for WebexClient {
    async fn get_message(&self, message_id: &str) -> Result<IncomingMessage> {
        let detail: MessageDetail = self
            .send(
                self.request(Method::GET, &format!("messages/{}", message_id)),
                "get message",
            )
            .await?;

        Ok(IncomingMessage {
            id: detail.id,
            room_id: detail.room_id,
            person_id: detail.person_id,
            person_email: detail.person_email,
            text: detail.text.unwrap_or_default(),
        })
    }

    async fn me_emails(&self) -> Result<Vec<String>> {
        let me: Person = self
            .send(self.request(Method::GET, "people/me"), "get bot identity")
            .await?;
        Ok(me.emails)
    }

    async fn person_email(&self, person_id: &str) -> Result<Option<String>> {
        let response = self
            .request(Method::GET, &format!("people/{}", person_id))
            .send()
            .await
            .context("Failed to send Webex request: get person")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("Webex API error ({}) on get person: {}", status, error_body);
        }

        let person: Person = response
            .json()
            .await
            .context("Failed to parse Webex response: get person")?;
        Ok(person.emails.into_iter().next())
    }

    async fn find_person_id(&self, email: &str) -> Result<Option<String>> {
        let people: ItemList<Person> = self
            .send(
                self.request(Method::GET, "people").query(&[("email", email)]),
                "list people",
            )
            .await?;
        Ok(people.items.into_iter().next().map(|p| p.id))
    }

    async fn room_title(&self, room_id: &str) -> Result<String> {
        let room: Room = self
            .send(
                self.request(Method::GET, &format!("rooms/{}", room_id)),
                "get room",
            )
            .await?;
        Ok(room.title)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        let rooms: ItemList<Room> = self
            .send(
                self.request(Method::GET, "rooms")
                    .query(&[("type", "group"), ("max", "1000")]),
                "list rooms",
            )
            .await?;
        Ok(rooms.items)
    }

    async fn create_room(&self, title: &str) -> Result<Room> {
        self.send(
            self.request(Method::POST, "rooms")
                .json(&json!({ "title": title })),
            "create room",
        )
        .await
    }

    async fn is_member(&self, room_id: &str, email: &str) -> Result<bool> {
        let memberships: ItemList<Membership> = self
            .send(
                self.request(Method::GET, "memberships")
                    .query(&[("roomId", room_id), ("personEmail", email)]),
                "list memberships",
            )
            .await?;
        Ok(!memberships.items.is_empty())
    }

    async fn add_member(&self, room_id: &str, person_id: &str) -> Result<String> {
        let membership: Membership = self
            .send(
                self.request(Method::POST, "memberships")
                    .json(&json!({ "roomId": room_id, "personId": person_id })),
                "create membership",
            )
            .await?;
        Ok(membership.id)
    }

    async fn send_to_room(&self, room_id: &str, markdown: &str) -> Result<()> {
        self.send_message(&OutgoingMessage {
            room_id: Some(room_id),
            to_person_email: None,
            markdown,
        })
        .await
    }

    async fn send_to_email(&self, email: &str, markdown: &str) -> Result<()> {
        self.send_message(&OutgoingMessage {
            room_id: None,
            to_person_email: Some(email),
            markdown,
        })
        .await
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        let webhooks: ItemList<Webhook> = self
            .send(self.request(Method::GET, "webhooks"), "list webhooks")
            .await?;
        Ok(webhooks.items)
    }

    async fn update_webhook(
        &self,
        webhook_id: &str,
        name: &str,
        target_url: &str,
    ) -> Result<Webhook> {
        self.send(
            self.request(Method::PUT, &format!("webhooks/{}", webhook_id))
                .json(&json!({ "name": name, "targetUrl": target_url })),
            "update webhook",
        )
        .await
    }

    async fn create_webhook(
        &self,
        name: &str,
        target_url: &str,
        resource: &str,
        event: &str,
    ) -> Result<Webhook> {
        self.send(
            self.request(Method::POST, "webhooks").json(&json!({
                "name": name,
                "targetUrl": target_url,
                "resource": resource,
                "event": event,
            })),
            "create webhook",
        )
        .await
    }
}

/// Connects `WebexClient`s against a fixed API base URL.
pub struct WebexConnector {
    api_base: String,
}

impl WebexConnector {
    pub fn new(api_base: &str) -> Self {
        Self {
            api_base: api_base.to_string(),
        }
    }
}

impl Connector for WebexConnector {
    fn connect(&self, token: &str) -> Result<Arc<dyn MessagingPlatform>> {
        Ok(Arc::new(WebexClient::new(&self.api_base, token)?))
    }
}
