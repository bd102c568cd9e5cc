use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::cases::{CaseSource, DomainPolicy};
use crate::commands::{self, case, CaseQuery, Command, TEST_REPLY};
use crate::parse::{extract_case_number, strip_command, CaseNumber};
use crate::platform::{IncomingMessage, MessageEvent, MessagingPlatform};

pub const ACCESS_LIMITED: &str =
    "Sorry, CASE API access is limited to Cisco Employees for the time being";
pub const NO_CASE_NUMBER: &str = "Sorry, no case number was found.";
pub const FEEDBACK_THANKS: &str = "Thank you. Your feedback has been sent to developers";

/// What happened to an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Sent by the bot itself; no reply
    Ignored,
    Replied(Command),
}

/// Turns inbound messages into exactly one reply each.
pub struct Dispatcher {
    cases: Arc<dyn CaseSource>,
    policy: DomainPolicy,
    feedback_room: Option<String>,
    clock: fn() -> DateTime<Utc>,
}

impl Dispatcher {
    pub fn new(
        cases: Arc<dyn CaseSource>,
        policy: DomainPolicy,
        feedback_room: Option<String>,
    ) -> Self {
        Self {
            cases,
            policy,
            feedback_room,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used for elapsed-time replies.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn handle(
        &self,
        platform: &dyn MessagingPlatform,
        event: &MessageEvent,
    ) -> Result<Outcome> {
        let message = platform.get_message(&event.id).await?;

        let own_emails = platform.me_emails().await?;
        if own_emails
            .iter()
            .any(|email| email.eq_ignore_ascii_case(&message.person_email))
        {
            debug!("Ignoring message {} sent by the bot", message.id);
            return Ok(Outcome::Ignored);
        }

        info!("Message from: {}", message.person_email);

        let command = commands::select(&message.text);
        debug!("Selected command: {}", command.token());

        let sender_id = if event.person_id.is_empty() {
            message.person_id.as_str()
        } else {
            event.person_id.as_str()
        };
        let room_id = if event.room_id.is_empty() {
            message.room_id.as_str()
        } else {
            event.room_id.as_str()
        };

        let reply = match command {
            Command::Help => commands::help_text(),
            Command::Echo => strip_command(command.token(), &message.text),
            Command::Test => TEST_REPLY.to_string(),
            Command::Feedback => {
                self.forward_feedback(platform, sender_id, &message).await?;
                FEEDBACK_THANKS.to_string()
            }
            Command::Case(query) => {
                self.case_reply(platform, query, sender_id, room_id, &message)
                    .await?
            }
        };

        platform.send_to_room(room_id, &reply).await?;
        Ok(Outcome::Replied(command))
    }

    async fn case_reply(
        &self,
        platform: &dyn MessagingPlatform,
        query: CaseQuery,
        sender_id: &str,
        room_id: &str,
        message: &IncomingMessage,
    ) -> Result<String> {
        let email = platform.person_email(sender_id).await?.unwrap_or_default();
        if !self.policy.permits(&email) {
            info!("Case access denied for {}", email);
            return Ok(ACCESS_LIMITED.to_string());
        }

        let token = Command::Case(query).token();
        let Some(number) = resolve_case_number(platform, token, room_id, message).await? else {
            return Ok(NO_CASE_NUMBER.to_string());
        };

        let Some(record) = self.cases.fetch_case(&number).await? else {
            info!("No case found for SR {}", number);
            return Ok(format!("No case was found for SR {}", number));
        };

        Ok(case::render(query, &number, &record, (self.clock)()))
    }

    async fn forward_feedback(
        &self,
        platform: &dyn MessagingPlatform,
        sender_id: &str,
        message: &IncomingMessage,
    ) -> Result<()> {
        let Some(room) = &self.feedback_room else {
            warn!("Feedback room not configured; dropping feedback");
            return Ok(());
        };

        let email = platform
            .person_email(sender_id)
            .await?
            .unwrap_or_else(|| message.person_email.clone());
        let content = strip_command(Command::Feedback.token(), &message.text);
        let feedback = format!(
            "User {} provided the following feedback:<br>{}",
            email, content
        );
        platform.send_to_room(room, &feedback).await
    }
}

/// Case number from the text after the command, else from the room title.
async fn resolve_case_number(
    platform: &dyn MessagingPlatform,
    token: &str,
    room_id: &str,
    message: &IncomingMessage,
) -> Result<Option<CaseNumber>> {
    let content = strip_command(token, &message.text);
    if let Some(number) = extract_case_number(&content) {
        return Ok(Some(number));
    }

    let title = platform.room_title(room_id).await?;
    Ok(extract_case_number(&title))
}
