//! What the local user does and sees.
//!
//! Turns typed commands into relay events (recording outgoing messages in
//! the store first) and folds relayed events back into the store.

use uketsuke_server::{
    domain::{DisplayName, Role, UserId, ValueObjectError},
    infrastructure::dto::websocket::{
        AgentMessagePayload, ClientEvent, CustomerMessagePayload, RegistrationPayload,
        ServerEvent, TypingPayload,
    },
};
use uketsuke_shared::time::timestamp_to_rfc3339;

use crate::{
    error::CommandError,
    model::Message,
    store::ConversationStore,
};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Say(String),
    To(String),
    End(String),
    List,
    Availability,
    Typing,
    Legacy(String),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  <text>             send a message
  /to <customerId>   (agent) select the conversation to reply to
  /typing            show a typing indicator to the other side
  /end <id>          end a conversation locally
  /list              list stored conversations
  /availability      ask whether an agent is online
  /legacy <text>     send an unaddressed legacy chat message
  /quit              exit";

impl Command {
    pub fn parse(line: &str, role: Role) -> Result<Self, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::EmptyMessage);
        }
        let Some(command) = line.strip_prefix('/') else {
            return Ok(Command::Say(line.to_string()));
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (command, ""),
        };

        match name {
            "to" if role != Role::Agent => Err(CommandError::AgentOnly("to")),
            "to" if argument.is_empty() => Err(CommandError::Usage("/to <customerId>")),
            "to" => Ok(Command::To(argument.to_string())),
            "end" if argument.is_empty() => Err(CommandError::Usage("/end <conversationId>")),
            "end" => Ok(Command::End(argument.to_string())),
            "list" => Ok(Command::List),
            "availability" => Ok(Command::Availability),
            "typing" => Ok(Command::Typing),
            "legacy" if argument.is_empty() => Err(CommandError::Usage("/legacy <text>")),
            "legacy" => Ok(Command::Legacy(argument.to_string())),
            "help" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

/// Result of a command
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Send(Vec<ClientEvent>),
    Print(Vec<String>),
    Quit,
}

/// Who the local user is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: UserId,
    pub name: DisplayName,
    pub role: Role,
}

impl Profile {
    pub fn new(id: String, name: String, role: Role) -> Result<Self, ValueObjectError> {
        Ok(Self {
            id: UserId::new(id)?,
            name: DisplayName::new(name),
            role,
        })
    }

    pub fn registration(&self) -> ClientEvent {
        ClientEvent::UserConnected(RegistrationPayload {
            id: self.id.as_str().to_string(),
            name: self.name.as_str().to_string(),
            role: self.role.as_str().to_string(),
            email: None,
            status: None,
        })
    }
}

pub struct Session {
    profile: Profile,
    /// A typing indicator we started and have not stopped yet
    typing: Option<TypingPayload>,
}

impl Session {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            typing: None,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn handle_command(
        &mut self,
        store: &mut ConversationStore,
        command: Command,
        now: i64,
    ) -> Result<Action, CommandError> {
        match command {
            Command::Say(text) => self.say(store, text, now).map(Action::Send),
            Command::To(customer_id) => {
                store.set_active_conversation(Some(customer_id.clone()));
                Ok(Action::Print(vec![format!("replying to {customer_id}")]))
            }
            Command::End(conversation_id) => {
                let line = if store.end_session(&conversation_id) {
                    format!("ended conversation {conversation_id}")
                } else {
                    format!("no conversation {conversation_id}")
                };
                Ok(Action::Print(vec![line]))
            }
            Command::List => Ok(Action::Print(list_lines(store))),
            Command::Availability => Ok(Action::Send(vec![ClientEvent::CheckAgentAvailability])),
            Command::Typing => {
                let payload = self.typing_payload(store)?;
                self.typing = Some(payload.clone());
                Ok(Action::Send(vec![ClientEvent::TypingStart(payload)]))
            }
            Command::Legacy(text) => Ok(Action::Send(vec![ClientEvent::LegacyChat(
                serde_json::json!({
                    "text": text,
                    "sender": self.profile.name.as_str(),
                    "timestamp": now,
                }),
            )])),
            Command::Help => Ok(Action::Print(HELP.lines().map(str::to_string).collect())),
            Command::Quit => Ok(Action::Quit),
        }
    }

    /// Record the message locally, then emit it (and end our typing indicator).
    fn say(
        &mut self,
        store: &mut ConversationStore,
        text: String,
        now: i64,
    ) -> Result<Vec<ClientEvent>, CommandError> {
        let profile = &self.profile;
        let message = match profile.role {
            Role::Customer => {
                let conversation_id = profile.id.as_str();
                store.add_message_at(
                    conversation_id,
                    Message::from_customer(conversation_id, profile.name.as_str(), &text, now),
                    now,
                );
                ClientEvent::CustomerMessage(CustomerMessagePayload {
                    customer_id: conversation_id.to_string(),
                    customer_name: profile.name.as_str().to_string(),
                    text: Some(text),
                    media: None,
                    timestamp: Some(serde_json::json!(now)),
                })
            }
            Role::Agent => {
                let customer_id = store
                    .active_conversation()
                    .ok_or(CommandError::NoActiveConversation)?
                    .to_string();
                store.add_message_at(
                    &customer_id,
                    Message::from_agent(profile.id.as_str(), profile.name.as_str(), &text, now),
                    now,
                );
                ClientEvent::AgentMessage(AgentMessagePayload {
                    customer_id,
                    agent_id: profile.id.as_str().to_string(),
                    agent_name: profile.name.as_str().to_string(),
                    text: Some(text),
                    media: None,
                    timestamp: Some(serde_json::json!(now)),
                })
            }
        };

        let mut events = vec![message];
        if let Some(typing) = self.typing.take() {
            events.push(ClientEvent::TypingStop(typing));
        }
        Ok(events)
    }

    fn typing_payload(&self, store: &ConversationStore) -> Result<TypingPayload, CommandError> {
        let target_id = match self.profile.role {
            Role::Customer => None,
            Role::Agent => Some(
                store
                    .active_conversation()
                    .ok_or(CommandError::NoActiveConversation)?
                    .to_string(),
            ),
        };
        Ok(TypingPayload {
            user_id: self.profile.id.as_str().to_string(),
            user_name: self.profile.name.as_str().to_string(),
            user_role: self.profile.role.as_str().to_string(),
            target_id,
        })
    }

    /// Fold a relayed event into the store; returns a line to show, if any.
    pub fn handle_event(
        &self,
        store: &mut ConversationStore,
        event: ServerEvent,
        now: i64,
    ) -> Option<String> {
        match event {
            ServerEvent::CustomerMessage(relayed) => {
                let line = format!("[{}] {}", relayed.customer_name, relayed.text);
                let message = Message::from_customer(
                    &relayed.customer_id,
                    &relayed.customer_name,
                    relayed.text,
                    relayed.timestamp,
                )
                .with_media(relayed.media);
                store.add_message_at(&relayed.customer_id, message, now);
                if store.active_conversation().is_none() {
                    store.set_active_conversation(Some(relayed.customer_id));
                }
                Some(line)
            }
            ServerEvent::AgentMessage(relayed) => {
                let line = format!("[{}] {}", relayed.agent_name, relayed.text);
                let message = Message::from_agent(
                    &relayed.agent_id,
                    &relayed.agent_name,
                    relayed.text,
                    relayed.timestamp,
                )
                .with_media(relayed.media);
                store.add_message_at(self.profile.id.as_str(), message, now);
                Some(line)
            }
            ServerEvent::UserTyping(typing) => {
                store.set_typing_at(&typing.user_id, &typing.user_name, true, now);
                Some(format!("{} is typing...", typing.user_name))
            }
            ServerEvent::UserStoppedTyping(stopped) => {
                store.set_typing_at(&stopped.user_id, "", false, now);
                None
            }
            ServerEvent::AgentAvailability(availability) => Some(if availability.available {
                "an agent is online".to_string()
            } else {
                "no agents are online right now".to_string()
            }),
            ServerEvent::LegacyChat(payload) => Some(format!("[legacy chat] {payload}")),
            ServerEvent::LegacyMedia(payload) => Some(format!("[legacy media] {payload}")),
        }
    }
}

fn list_lines(store: &ConversationStore) -> Vec<String> {
    if store.is_empty() {
        return vec!["no conversations".to_string()];
    }
    store
        .conversations()
        .map(|conversation| {
            let marker = if store.active_conversation() == Some(conversation.id.as_str()) {
                "*"
            } else {
                " "
            };
            format!(
                "{} {} ({}) {} message(s), last activity {}, expires {}",
                marker,
                conversation.id,
                conversation.customer_name,
                conversation.messages.len(),
                timestamp_to_rfc3339(conversation.last_activity),
                timestamp_to_rfc3339(conversation.session_expires_at),
            )
        })
        .collect()
}
