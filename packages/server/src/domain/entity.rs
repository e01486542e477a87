//! Core domain models for the support relay.

use serde::{Deserialize, Serialize};

use super::{
    error::ValueObjectError,
    value_object::{ConnectionId, DisplayName, MessageText, PresenceStatus, Role, UserId},
};

/// Who is on the other end of a connection, as vouched for by auth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub name: DisplayName,
    pub role: Role,
    #[serde(default)]
    pub status: PresenceStatus,
}

impl Identity {
    pub fn new(id: UserId, name: DisplayName, role: Role) -> Self {
        Self {
            id,
            name,
            role,
            status: PresenceStatus::default(),
        }
    }

    pub fn with_status(mut self, status: PresenceStatus) -> Self {
        self.status = status;
        self
    }
}

/// A registered identity bound to its live connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub connection: ConnectionId,
    pub identity: Identity,
}

impl ConnectionRecord {
    pub fn new(connection: ConnectionId, identity: Identity) -> Self {
        Self {
            connection,
            identity,
        }
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }
}

/// Descriptor of an uploaded file. The relay never looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    /// "image", "video" or "file"
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub name: String,
    pub size: u64,
}

/// Chat content shared by both message directions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    pub text: MessageText,
    pub media: Option<MediaAttachment>,
}

impl MessageBody {
    /// Create a message body.
    ///
    /// # Errors
    ///
    /// Returns `ValueObjectError::MessageEmpty` when there is neither text nor media
    pub fn new(
        text: MessageText,
        media: Option<MediaAttachment>,
    ) -> Result<Self, ValueObjectError> {
        if text.is_empty() && media.is_none() {
            return Err(ValueObjectError::MessageEmpty);
        }
        Ok(Self { text, media })
    }
}

/// A customer's message, fanned out to every agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerMessage {
    pub customer_id: UserId,
    pub customer_name: DisplayName,
    pub body: MessageBody,
}

/// An agent's reply, addressed to exactly one customer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentMessage {
    pub customer_id: UserId,
    pub agent_id: UserId,
    pub agent_name: DisplayName,
    pub body: MessageBody,
}

/// Typing start/stop signal as sent by a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingSignal {
    pub user_id: UserId,
    pub user_name: DisplayName,
    pub role: Role,
    /// Required for agents; customers broadcast to all agents
    pub target_id: Option<UserId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> MediaAttachment {
        MediaAttachment {
            kind: "image".to_string(),
            url: "https://files.example.com/a.png".to_string(),
            name: "a.png".to_string(),
            size: 2048,
        }
    }

    #[test]
    fn test_message_body_requires_text_or_media() {
        // テスト項目: テキストもメディアもないメッセージは作成できない
        // when (操作):
        let empty = MessageBody::new(MessageText::default(), None);
        let text_only = MessageBody::new(MessageText::new("help".to_string()), None);
        let media_only = MessageBody::new(MessageText::default(), Some(media()));

        // then (期待する結果):
        assert_eq!(empty.unwrap_err(), ValueObjectError::MessageEmpty);
        assert!(text_only.is_ok());
        assert!(media_only.is_ok());
    }

    #[test]
    fn test_media_attachment_serializes_type_field() {
        // テスト項目: メディアの種別は "type" キーでシリアライズされる
        // when (操作):
        let json = serde_json::to_value(media()).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "image");
        assert_eq!(json["size"], 2048);
    }

    #[test]
    fn test_connection_record_role() {
        // テスト項目: 接続レコードのロールは ID 情報のロールと一致する
        // given (前提条件):
        let identity = Identity::new(
            UserId::new("a1".to_string()).unwrap(),
            DisplayName::new("Bob".to_string()),
            Role::Agent,
        );

        // when (操作):
        let record = ConnectionRecord::new(
            ConnectionId::from_uuid(uuid::Uuid::new_v4()),
            identity,
        );

        // then (期待する結果):
        assert_eq!(record.role(), Role::Agent);
    }
}
