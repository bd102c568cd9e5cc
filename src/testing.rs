//! In-memory stand-ins for the Webex and case APIs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;

use crate::cases::{CaseRecord, CaseSource};
use crate::parse::CaseNumber;
use crate::platform::{
    Connector, IncomingMessage, MessageEvent, MessagingPlatform, Room, Webhook,
};

#[derive(Default)]
struct PlatformState {
    people: HashMap<String, String>,
    messages: HashMap<String, IncomingMessage>,
    rooms: Vec<Room>,
    memberships: Vec<(String, String)>,
    sent: Vec<(String, String)>,
    webhooks: Vec<Webhook>,
    fail_webhook_listing: bool,
    room_title_lookups: usize,
    next_id: usize,
}

impl PlatformState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

pub struct FakePlatform {
    bot_email: String,
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    pub fn new(bot_email: &str) -> Self {
        Self {
            bot_email: bot_email.to_string(),
            state: Mutex::new(PlatformState::default()),
        }
    }

    pub fn add_person(&self, id: &str, email: &str) {
        let mut state = self.state.lock().unwrap();
        state.people.insert(id.to_string(), email.to_string());
    }

    pub fn add_room(&self, id: &str, title: &str) {
        let mut state = self.state.lock().unwrap();
        state.rooms.push(Room {
            id: id.to_string(),
            title: title.to_string(),
        });
    }

    pub fn add_membership(&self, room_id: &str, email: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .memberships
            .push((room_id.to_string(), email.to_string()));
    }

    pub fn add_webhook(&self, name: &str, target_url: &str) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("webhook");
        state.webhooks.push(Webhook {
            id,
            name: name.to_string(),
            target_url: target_url.to_string(),
            resource: "messages".to_string(),
            event: "created".to_string(),
        });
    }

    pub fn fail_webhook_listing(&self) {
        self.state.lock().unwrap().fail_webhook_listing = true;
    }

    /// Store a message as if the person had typed it and return the webhook event.
    pub fn post_message(&self, room_id: &str, person_id: &str, text: &str) -> MessageEvent {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id("message");
        let person_email = state.people.get(person_id).cloned().unwrap_or_default();
        state.messages.insert(
            id.clone(),
            IncomingMessage {
                id: id.clone(),
                room_id: room_id.to_string(),
                person_id: person_id.to_string(),
                person_email,
                text: text.to_string(),
            },
        );
        MessageEvent {
            id,
            room_id: room_id.to_string(),
            person_id: person_id.to_string(),
        }
    }

    /// Messages sent so far as `(room id or email, markdown)`
    pub fn sent(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn rooms(&self) -> Vec<Room> {
        self.state.lock().unwrap().rooms.clone()
    }

    pub fn memberships(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().memberships.clone()
    }

    pub fn webhooks(&self) -> Vec<Webhook> {
        self.state.lock().unwrap().webhooks.clone()
    }

    pub fn room_title_lookups(&self) -> usize {
        self.state.lock().unwrap().room_title_lookups
    }
}

#[async_trait]
impl MessagingPlatform for FakePlatform {
    async fn get_message(&self, message_id: &str) -> Result<IncomingMessage> {
        let state = self.state.lock().unwrap();
        state
            .messages
            .get(message_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown message {}", message_id))
    }

    async fn me_emails(&self) -> Result<Vec<String>> {
        Ok(vec![self.bot_email.clone()])
    }

    async fn person_email(&self, person_id: &str) -> Result<Option<String>> {
        Ok(self.state.lock().unwrap().people.get(person_id).cloned())
    }

    async fn find_person_id(&self, email: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .people
            .iter()
            .find(|(_, e)| e.as_str() == email)
            .map(|(id, _)| id.clone()))
    }

    async fn room_title(&self, room_id: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.room_title_lookups += 1;
        state
            .rooms
            .iter()
            .find(|r| r.id == room_id)
            .map(|r| r.title.clone())
            .ok_or_else(|| anyhow::anyhow!("unknown room {}", room_id))
    }

    async fn list_rooms(&self) -> Result<Vec<Room>> {
        Ok(self.rooms())
    }

    async fn create_room(&self, title: &str) -> Result<Room> {
        let mut state = self.state.lock().unwrap();
        let room = Room {
            id: state.next_id("room"),
            title: title.to_string(),
        };
        state.rooms.push(room.clone());
        Ok(room)
    }

    async fn is_member(&self, room_id: &str, email: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .memberships
            .iter()
            .any(|(room, member)| room == room_id && member == email))
    }

    async fn add_member(&self, room_id: &str, person_id: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        let email = state
            .people
            .get(person_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown person {}", person_id))?;
        state.memberships.push((room_id.to_string(), email));
        Ok(state.next_id("membership"))
    }

    async fn send_to_room(&self, room_id: &str, markdown: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sent.push((room_id.to_string(), markdown.to_string()));
        Ok(())
    }

    async fn send_to_email(&self, email: &str, markdown: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.sent.push((email.to_string(), markdown.to_string()));
        Ok(())
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>> {
        let hooks = {
            let state = self.state.lock().unwrap();
            if state.fail_webhook_listing {
                anyhow::bail!("webhook listing unavailable");
            }
            state.webhooks.clone()
        };
        // Give other tasks a chance to run between listing and acting on it.
        tokio::task::yield_now().await;
        Ok(hooks)
    }

    async fn update_webhook(
        &self,
        webhook_id: &str,
        name: &str,
        target_url: &str,
    ) -> Result<Webhook> {
        let mut state = self.state.lock().unwrap();
        let hook = state
            .webhooks
            .iter_mut()
            .find(|h| h.id == webhook_id)
            .ok_or_else(|| anyhow::anyhow!("unknown webhook {}", webhook_id))?;
        hook.name = name.to_string();
        hook.target_url = target_url.to_string();
        Ok(hook.clone())
    }

    async fn create_webhook(
        &self,
        name: &str,
        target_url: &str,
        resource: &str,
        event: &str,
    ) -> Result<Webhook> {
        let mut state = self.state.lock().unwrap();
        let hook = Webhook {
            id: state.next_id("webhook"),
            name: name.to_string(),
            target_url: target_url.to_string(),
            resource: resource.to_string(),
            event: event.to_string(),
        };
        state.webhooks.push(hook.clone());
        Ok(hook)
    }
}

/// Hands out the same fake platform for every token and records the tokens.
pub struct FakeConnector {
    platform: Arc<FakePlatform>,
    tokens: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(platform: Arc<FakePlatform>) -> Self {
        Self {
            platform,
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }
}

impl Connector for FakeConnector {
    fn connect(&self, token: &str) -> Result<Arc<dyn MessagingPlatform>> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(self.platform.clone())
    }
}

#[derive(Default)]
pub struct FakeCases {
    records: Mutex<HashMap<String, CaseRecord>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeCases {
    pub fn insert(&self, number: &str, record: CaseRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(number.to_string(), record);
    }

    /// Case numbers requested so far
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl CaseSource for FakeCases {
    async fn fetch_case(&self, number: &CaseNumber) -> Result<Option<CaseRecord>> {
        self.fetched.lock().unwrap().push(number.to_string());
        Ok(self.records.lock().unwrap().get(number.as_str()).cloned())
    }
}
