//! Session lifecycle of locally visible conversations.
//!
//! Messages are deduplicated on insert, every conversation mutation is
//! written through to persistence, and conversations expire on two
//! independent rules:
//!
//! - the session window: more than 24 hours after creation
//! - inactivity: more than 24 hours since the last message
//!
//! Operations taking `now` exist for deterministic tests; the plain
//! variants read the system clock.

use std::collections::HashMap;

use uketsuke_shared::time::now_millis;

use crate::{
    model::{Conversation, Message, MessageKind, TypingEntry},
    persistence::{ConversationMap, ConversationPersistence, StoredConversations},
};

/// Typing indicators older than this are dropped by cleanup
pub const TYPING_ENTRY_TTL_MS: i64 = 5 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddMessageOutcome {
    /// First message; the conversation was created
    Created,
    Appended,
    /// Matched an existing message and was skipped
    Duplicate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed_conversations: Vec<String>,
    pub removed_typing: usize,
    pub active_cleared: bool,
}

impl CleanupReport {
    pub fn is_empty(&self) -> bool {
        self.removed_conversations.is_empty() && self.removed_typing == 0
    }
}

pub struct ConversationStore {
    conversations: ConversationMap,
    active: Option<String>,
    typing: HashMap<String, TypingEntry>,
    persistence: Box<dyn ConversationPersistence>,
}

impl ConversationStore {
    /// Load persisted conversations, dropping those that fail either expiry rule.
    ///
    /// Storage problems never prevent startup: an unreadable record starts
    /// the store empty and an undecodable conversation is dropped.
    pub fn open(persistence: Box<dyn ConversationPersistence>) -> Self {
        Self::open_at(persistence, now_millis())
    }

    pub fn open_at(persistence: Box<dyn ConversationPersistence>, now: i64) -> Self {
        let mut conversations = ConversationMap::new();
        let mut dropped = 0;

        let stored = persistence.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable stored conversations: {}", e);
            None
        });
        for (id, entry) in stored.into_iter().flat_map(StoredConversations::entries) {
            match entry {
                Ok(stored) => {
                    let conversation = stored.into_conversation(now);
                    if conversation.survives_reload(now) {
                        conversations.insert(id, conversation);
                    } else {
                        dropped += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!("Dropping unreadable conversation '{}': {}", id, e);
                    dropped += 1;
                }
            }
        }

        tracing::info!(
            "Restored {} conversation(s), dropped {}",
            conversations.len(),
            dropped
        );

        let store = Self {
            conversations,
            active: None,
            typing: HashMap::new(),
            persistence,
        };
        if dropped > 0 {
            store.persist(now);
        }
        store
    }

    pub fn add_message(&mut self, conversation_id: &str, message: Message) -> AddMessageOutcome {
        self.add_message_at(conversation_id, message, now_millis())
    }

    /// Insert a message, creating the conversation on first contact.
    pub fn add_message_at(
        &mut self,
        conversation_id: &str,
        message: Message,
        now: i64,
    ) -> AddMessageOutcome {
        let mut outcome = AddMessageOutcome::Appended;
        let conversation = self
            .conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Opening conversation '{}'", conversation_id);
                outcome = AddMessageOutcome::Created;
                Conversation::open(conversation_id, &message, now)
            });

        if conversation
            .messages
            .iter()
            .any(|existing| message.is_duplicate_of(existing))
        {
            tracing::debug!("Skipping duplicate message '{}'", message.id);
            return AddMessageOutcome::Duplicate;
        }

        conversation.last_activity = message.timestamp;
        if message.kind == MessageKind::Agent && message.agent_id.is_some() {
            conversation.agent_id = message.agent_id.clone();
            conversation.agent_name = message.agent_name.clone();
        }
        conversation.messages.push(message);

        self.persist(now);
        outcome
    }

    pub fn set_active_conversation(&mut self, conversation_id: Option<String>) {
        self.active = conversation_id;
    }

    pub fn active_conversation(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn set_typing(&mut self, user_id: &str, name: &str, is_typing: bool) {
        self.set_typing_at(user_id, name, is_typing, now_millis());
    }

    pub fn set_typing_at(&mut self, user_id: &str, name: &str, is_typing: bool, now: i64) {
        if is_typing {
            self.typing.insert(
                user_id.to_string(),
                TypingEntry {
                    name: name.to_string(),
                    since: now,
                },
            );
        } else {
            self.typing.remove(user_id);
        }
    }

    pub fn typing_users(&self) -> impl Iterator<Item = (&str, &TypingEntry)> {
        self.typing.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn cleanup_expired_messages(&mut self) -> CleanupReport {
        self.cleanup_expired_messages_at(now_millis())
    }

    /// Drop expired conversations and stale typing entries.
    pub fn cleanup_expired_messages_at(&mut self, now: i64) -> CleanupReport {
        let mut report = CleanupReport::default();

        self.conversations.retain(|id, conversation| {
            if conversation.is_expired(now) {
                report.removed_conversations.push(id.clone());
                false
            } else {
                true
            }
        });

        if self
            .active
            .as_ref()
            .is_some_and(|active| report.removed_conversations.contains(active))
        {
            self.active = None;
            report.active_cleared = true;
        }

        let before = self.typing.len();
        self.typing
            .retain(|_, entry| now - entry.since <= TYPING_ENTRY_TTL_MS);
        report.removed_typing = before - self.typing.len();

        if !report.removed_conversations.is_empty() {
            tracing::info!(
                "Cleaned up {} expired conversation(s)",
                report.removed_conversations.len()
            );
            self.persist(now);
        }

        report
    }

    /// The one cleanup entry point shared by every schedule.
    pub fn reconcile(&mut self) -> CleanupReport {
        self.cleanup_expired_messages()
    }

    pub fn clear_all_conversations(&mut self) {
        self.conversations.clear();
        self.active = None;
        self.typing.clear();
        self.persist(now_millis());
    }

    /// End a session immediately. Returns `false` for an unknown id.
    pub fn end_session(&mut self, conversation_id: &str) -> bool {
        if self.conversations.remove(conversation_id).is_none() {
            return false;
        }
        if self.active.as_deref() == Some(conversation_id) {
            self.active = None;
        }
        tracing::info!("Ended session for conversation '{}'", conversation_id);
        self.persist(now_millis());
        true
    }

    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    pub fn conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.values()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Write-through. A failed save is logged and the mutation stands.
    fn persist(&self, now: i64) {
        if let Err(e) = self.persistence.save(&self.conversations, now) {
            tracing::warn!("Failed to persist conversations: {}", e);
        }
    }
}
