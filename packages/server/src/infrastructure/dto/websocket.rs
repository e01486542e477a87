//! WebSocket frame DTOs.
//!
//! Every frame is `{"event": <name>, "data": <payload>}` with camelCase
//! payload keys. Inbound payloads keep raw strings; conversion into domain
//! types happens through `TryFrom` so validation failures surface as
//! `ValueObjectError`.

use serde::{Deserialize, Serialize};

use crate::domain::{
    AgentMessage, CustomerMessage, DisplayName, Identity, LegacyChannel, MediaAttachment,
    MessageBody, MessageText, Notification, PresenceStatus, Role, TypingSignal, UserId,
    ValueObjectError,
};

/// Frames sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "user_connected")]
    UserConnected(RegistrationPayload),
    #[serde(rename = "typing_start")]
    TypingStart(TypingPayload),
    #[serde(rename = "typing_stop")]
    TypingStop(TypingPayload),
    #[serde(rename = "customer_message")]
    CustomerMessage(CustomerMessagePayload),
    #[serde(rename = "agent_message")]
    AgentMessage(AgentMessagePayload),
    #[serde(rename = "check_agent_availability")]
    CheckAgentAvailability,
    #[serde(rename = "chat message")]
    LegacyChat(serde_json::Value),
    #[serde(rename = "media message")]
    LegacyMedia(serde_json::Value),
}

/// Frames sent by the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    #[serde(rename = "user_typing")]
    UserTyping(UserTypingPayload),
    #[serde(rename = "user_stopped_typing")]
    UserStoppedTyping(UserStoppedTypingPayload),
    #[serde(rename = "customer_message")]
    CustomerMessage(RelayedCustomerMessage),
    #[serde(rename = "agent_message")]
    AgentMessage(RelayedAgentMessage),
    #[serde(rename = "agent_availability")]
    AgentAvailability(AvailabilityPayload),
    #[serde(rename = "chat message")]
    LegacyChat(serde_json::Value),
    #[serde(rename = "media message")]
    LegacyMedia(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMessagePayload {
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    /// Client clock; ignored by the relay, which stamps its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessagePayload {
    pub customer_id: String,
    pub agent_id: String,
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub user_id: String,
    pub user_name: String,
    pub user_role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStoppedTypingPayload {
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedCustomerMessage {
    pub customer_id: String,
    pub customer_name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    /// Relay receipt time, Unix milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayedAgentMessage {
    pub agent_id: String,
    pub agent_name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    /// Relay receipt time, Unix milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityPayload {
    pub available: bool,
}

impl TryFrom<RegistrationPayload> for Identity {
    type Error = ValueObjectError;

    fn try_from(payload: RegistrationPayload) -> Result<Self, Self::Error> {
        let status = PresenceStatus::from_wire(payload.status.as_deref());
        Ok(Identity::new(
            UserId::new(payload.id)?,
            DisplayName::new(payload.name),
            payload.role.parse()?,
        )
        .with_status(status))
    }
}

impl TryFrom<TypingPayload> for TypingSignal {
    type Error = ValueObjectError;

    fn try_from(payload: TypingPayload) -> Result<Self, Self::Error> {
        Ok(TypingSignal {
            user_id: UserId::new(payload.user_id)?,
            user_name: DisplayName::new(payload.user_name),
            role: payload.user_role.parse()?,
            target_id: payload
                .target_id
                .filter(|id| !id.is_empty())
                .map(UserId::new)
                .transpose()?,
        })
    }
}

impl TryFrom<CustomerMessagePayload> for CustomerMessage {
    type Error = ValueObjectError;

    fn try_from(payload: CustomerMessagePayload) -> Result<Self, Self::Error> {
        Ok(CustomerMessage {
            customer_id: UserId::new(payload.customer_id)?,
            customer_name: DisplayName::new(payload.customer_name),
            body: MessageBody::new(
                MessageText::new(payload.text.unwrap_or_default()),
                payload.media,
            )?,
        })
    }
}

impl TryFrom<AgentMessagePayload> for AgentMessage {
    type Error = ValueObjectError;

    fn try_from(payload: AgentMessagePayload) -> Result<Self, Self::Error> {
        Ok(AgentMessage {
            customer_id: UserId::new(payload.customer_id)?,
            agent_id: UserId::new(payload.agent_id)?,
            agent_name: DisplayName::new(payload.agent_name),
            body: MessageBody::new(
                MessageText::new(payload.text.unwrap_or_default()),
                payload.media,
            )?,
        })
    }
}

impl From<Notification> for ServerEvent {
    fn from(notification: Notification) -> Self {
        match notification {
            Notification::UserTyping {
                user_id,
                user_name,
                role,
            } => ServerEvent::UserTyping(UserTypingPayload {
                user_id: user_id.into_string(),
                user_name: user_name.into_string(),
                user_role: role,
            }),
            Notification::UserStoppedTyping { user_id } => {
                ServerEvent::UserStoppedTyping(UserStoppedTypingPayload {
                    user_id: user_id.into_string(),
                })
            }
            Notification::CustomerMessage {
                customer_id,
                customer_name,
                text,
                media,
                timestamp,
            } => ServerEvent::CustomerMessage(RelayedCustomerMessage {
                customer_id: customer_id.into_string(),
                customer_name: customer_name.into_string(),
                text: text.into_string(),
                media,
                timestamp: timestamp.value(),
            }),
            Notification::AgentMessage {
                agent_id,
                agent_name,
                text,
                media,
                timestamp,
            } => ServerEvent::AgentMessage(RelayedAgentMessage {
                agent_id: agent_id.into_string(),
                agent_name: agent_name.into_string(),
                text: text.into_string(),
                media,
                timestamp: timestamp.value(),
            }),
            Notification::AgentAvailability { available } => {
                ServerEvent::AgentAvailability(AvailabilityPayload { available })
            }
            Notification::Legacy {
                channel: LegacyChannel::Chat,
                payload,
            } => ServerEvent::LegacyChat(payload),
            Notification::Legacy {
                channel: LegacyChannel::Media,
                payload,
            } => ServerEvent::LegacyMedia(payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;
    use serde_json::json;

    #[test]
    fn test_parse_registration_frame() {
        // テスト項目: 登録フレームを解析し ID 情報に変換できる
        // given (前提条件):
        let frame = json!({
            "event": "user_connected",
            "data": {"id": "c1", "name": "Alice", "role": "customer", "email": "a@example.com"}
        });

        // when (操作):
        let event: ClientEvent = serde_json::from_value(frame).unwrap();

        // then (期待する結果):
        let ClientEvent::UserConnected(payload) = event else {
            panic!("unexpected event");
        };
        let identity = Identity::try_from(payload).unwrap();
        assert_eq!(identity.id.as_str(), "c1");
        assert_eq!(identity.role, Role::Customer);
    }

    #[test]
    fn test_parse_availability_query_without_data() {
        // テスト項目: data を持たない対応可否問い合わせを解析できる
        // when (操作):
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"check_agent_availability"}"#).unwrap();

        // then (期待する結果):
        assert_eq!(event, ClientEvent::CheckAgentAvailability);
    }

    #[test]
    fn test_parse_legacy_frame_keeps_payload() {
        // テスト項目: レガシーフレームはペイロードをそのまま保持する
        // when (操作):
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"chat message","data":"hello"}"#).unwrap();

        // then (期待する結果):
        assert_eq!(event, ClientEvent::LegacyChat(json!("hello")));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        // テスト項目: 不明なロールの登録は変換エラーになる
        // given (前提条件):
        let payload = RegistrationPayload {
            id: "x".to_string(),
            name: "Mallory".to_string(),
            role: "admin".to_string(),
            email: None,
            status: None,
        };

        // when (操作):
        let result = Identity::try_from(payload);

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            ValueObjectError::UnknownRole("admin".to_string())
        );
    }

    #[test]
    fn test_registration_keeps_empty_name_and_long_id() {
        // テスト項目: 空の名前や長い ID でも登録は受け付けられ、値はそのまま保持される
        // given (前提条件):
        let long_id = "c".repeat(101);
        let unnamed = RegistrationPayload {
            id: "c1".to_string(),
            name: String::new(),
            role: "customer".to_string(),
            email: None,
            status: None,
        };
        let padded = RegistrationPayload {
            id: long_id.clone(),
            name: "  Alice ".to_string(),
            role: "customer".to_string(),
            email: None,
            status: None,
        };

        // when (操作):
        let unnamed = Identity::try_from(unnamed).unwrap();
        let padded = Identity::try_from(padded).unwrap();

        // then (期待する結果):
        assert_eq!(unnamed.name.as_str(), "");
        assert_eq!(padded.id.as_str(), long_id);
        assert_eq!(padded.name.as_str(), "  Alice ");
    }

    #[test]
    fn test_registration_status_is_read_leniently() {
        // テスト項目: status は busy / offline だけを区別し、未指定や未知の値は online になる
        // given (前提条件):
        let payload = |status: Option<&str>| RegistrationPayload {
            id: "a1".to_string(),
            name: "Bob".to_string(),
            role: "agent".to_string(),
            email: None,
            status: status.map(str::to_string),
        };

        // when (操作):
        let status = |status| Identity::try_from(payload(status)).unwrap().status;

        // then (期待する結果):
        assert_eq!(status(Some("busy")), PresenceStatus::Busy);
        assert_eq!(status(Some("offline")), PresenceStatus::Offline);
        assert_eq!(status(Some("away")), PresenceStatus::Online);
        assert_eq!(status(None), PresenceStatus::Online);
    }

    #[test]
    fn test_registration_without_id_is_rejected() {
        // テスト項目: 空の ID の登録だけは変換エラーになる
        // given (前提条件):
        let payload = RegistrationPayload {
            id: String::new(),
            name: "Alice".to_string(),
            role: "customer".to_string(),
            email: None,
            status: None,
        };

        // when (操作):
        let result = Identity::try_from(payload);

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::UserIdEmpty);
    }

    #[test]
    fn test_customer_message_with_empty_name_is_accepted() {
        // テスト項目: 顧客名が空でもメッセージは変換される
        // given (前提条件):
        let frame = json!({
            "event": "customer_message",
            "data": {"customerId": "c1", "customerName": "", "text": "help"}
        });
        let ClientEvent::CustomerMessage(payload) = serde_json::from_value(frame).unwrap() else {
            panic!("unexpected event");
        };

        // when (操作):
        let message = CustomerMessage::try_from(payload).unwrap();

        // then (期待する結果):
        assert_eq!(message.customer_name.as_str(), "");
        assert_eq!(message.body.text.as_str(), "help");
    }

    #[test]
    fn test_customer_message_without_text_or_media_is_rejected() {
        // テスト項目: テキストもメディアもない顧客メッセージは変換エラーになる
        // given (前提条件):
        let frame = json!({
            "event": "customer_message",
            "data": {"customerId": "c1", "customerName": "Alice"}
        });
        let ClientEvent::CustomerMessage(payload) = serde_json::from_value(frame).unwrap() else {
            panic!("unexpected event");
        };

        // when (操作):
        let result = CustomerMessage::try_from(payload);

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), ValueObjectError::MessageEmpty);
    }

    #[test]
    fn test_empty_target_id_is_treated_as_absent() {
        // テスト項目: 空の targetId は未指定として扱われる
        // given (前提条件):
        let payload = TypingPayload {
            user_id: "a1".to_string(),
            user_name: "Bob".to_string(),
            user_role: "agent".to_string(),
            target_id: Some(String::new()),
        };

        // when (操作):
        let signal = TypingSignal::try_from(payload).unwrap();

        // then (期待する結果):
        assert!(signal.target_id.is_none());
    }

    #[test]
    fn test_serialize_relayed_customer_message() {
        // テスト項目: 中継された顧客メッセージは camelCase でシリアライズされる
        // given (前提条件):
        let notification = Notification::CustomerMessage {
            customer_id: UserId::new("c1".to_string()).unwrap(),
            customer_name: DisplayName::new("Alice".to_string()),
            text: MessageText::new("help".to_string()),
            media: None,
            timestamp: Timestamp::new(1234),
        };

        // when (操作):
        let json = serde_json::to_value(ServerEvent::from(notification)).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            json!({
                "event": "customer_message",
                "data": {
                    "customerId": "c1",
                    "customerName": "Alice",
                    "text": "help",
                    "timestamp": 1234
                }
            })
        );
    }

    #[test]
    fn test_serialize_typing_notifications() {
        // テスト項目: 入力中・入力停止の通知は所定の形式でシリアライズされる
        // given (前提条件):
        let started = Notification::UserTyping {
            user_id: UserId::new("c1".to_string()).unwrap(),
            user_name: DisplayName::new("Alice".to_string()),
            role: Role::Customer,
        };
        let stopped = Notification::UserStoppedTyping {
            user_id: UserId::new("c1".to_string()).unwrap(),
        };

        // when (操作):
        let started = serde_json::to_value(ServerEvent::from(started)).unwrap();
        let stopped = serde_json::to_value(ServerEvent::from(stopped)).unwrap();

        // then (期待する結果):
        assert_eq!(
            started,
            json!({
                "event": "user_typing",
                "data": {"userId": "c1", "userName": "Alice", "userRole": "customer"}
            })
        );
        assert_eq!(
            stopped,
            json!({"event": "user_stopped_typing", "data": {"userId": "c1"}})
        );
    }
}
