//! Outbound notifications produced by relay operations.
//!
//! The domain decides *who* hears *what*; the infrastructure layer turns a
//! `Delivery` into a wire frame and pushes it down the connection.

use super::{ConnectionId, DisplayName, MediaAttachment, MessageText, Role, Timestamp, UserId};

/// Unaddressed pre-routing events kept for old clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyChannel {
    Chat,
    Media,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    UserTyping {
        user_id: UserId,
        user_name: DisplayName,
        role: Role,
    },
    UserStoppedTyping {
        user_id: UserId,
    },
    CustomerMessage {
        customer_id: UserId,
        customer_name: DisplayName,
        text: MessageText,
        media: Option<MediaAttachment>,
        timestamp: Timestamp,
    },
    AgentMessage {
        agent_id: UserId,
        agent_name: DisplayName,
        text: MessageText,
        media: Option<MediaAttachment>,
        timestamp: Timestamp,
    },
    AgentAvailability {
        available: bool,
    },
    Legacy {
        channel: LegacyChannel,
        payload: serde_json::Value,
    },
}

/// One notification bound for one connection
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: ConnectionId,
    pub notification: Notification,
}

impl Delivery {
    pub fn new(to: ConnectionId, notification: Notification) -> Self {
        Self { to, notification }
    }
}
