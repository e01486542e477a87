//! Client-side conversation model.
//!
//! Field names follow the relay's camelCase wire format so a persisted store
//! reads like the frames it was built from.

use serde::{Deserialize, Serialize};
use uketsuke_server::domain::MediaAttachment;
use uketsuke_shared::time::DAY_MS;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Customer,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
}

impl Message {
    /// Message written by a customer, with a fresh local id.
    pub fn from_customer(
        customer_id: impl Into<String>,
        customer_name: impl Into<String>,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp,
            kind: MessageKind::Customer,
            customer_id: Some(customer_id.into()),
            customer_name: Some(customer_name.into()),
            agent_id: None,
            agent_name: None,
            media: None,
        }
    }

    /// Message written by an agent, with a fresh local id.
    pub fn from_agent(
        agent_id: impl Into<String>,
        agent_name: impl Into<String>,
        text: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp,
            kind: MessageKind::Agent,
            customer_id: None,
            customer_name: None,
            agent_id: Some(agent_id.into()),
            agent_name: Some(agent_name.into()),
            media: None,
        }
    }

    pub fn with_media(mut self, media: Option<MediaAttachment>) -> Self {
        self.media = media;
        self
    }

    /// Same id, or the same text and author kind within two seconds.
    pub fn is_duplicate_of(&self, other: &Message) -> bool {
        self.id == other.id
            || (self.text == other.text
                && self.kind == other.kind
                && (self.timestamp - other.timestamp).abs() < DUPLICATE_WINDOW_MS)
    }
}

/// Window in which an identical text of the same kind counts as an echo
pub const DUPLICATE_WINDOW_MS: i64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub messages: Vec<Message>,
    pub last_activity: i64,
    pub created_at: i64,
    pub is_active: bool,
    /// Fixed at creation; activity never extends it
    pub session_expires_at: i64,
}

impl Conversation {
    /// Open a conversation for its first message.
    pub fn open(id: impl Into<String>, first: &Message, now: i64) -> Self {
        let id = id.into();
        Self {
            customer_id: first.customer_id.clone().unwrap_or_else(|| id.clone()),
            customer_name: first
                .customer_name
                .clone()
                .or_else(|| first.agent_name.clone())
                .unwrap_or_else(|| "Unknown Customer".to_string()),
            agent_id: first.agent_id.clone(),
            agent_name: first.agent_name.clone(),
            messages: Vec::new(),
            last_activity: first.timestamp,
            created_at: first.timestamp,
            is_active: true,
            session_expires_at: now + DAY_MS,
            id,
        }
    }

    /// The session window has closed.
    pub fn is_session_expired(&self, now: i64) -> bool {
        now > self.session_expires_at
    }

    /// No message for more than a day.
    pub fn is_idle_expired(&self, now: i64) -> bool {
        now - self.last_activity > DAY_MS
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.is_session_expired(now) || self.is_idle_expired(now)
    }

    /// Load-time check: both windows must still be strictly open.
    pub fn survives_reload(&self, now: i64) -> bool {
        now - self.last_activity < DAY_MS && now < self.session_expires_at
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Someone the local user currently sees typing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    pub name: String,
    /// When the indicator was last set, Unix milliseconds
    pub since: i64,
}
