//! Durable storage of the conversation map.
//!
//! The stored record is `{conversations, timestamp}`: the conversation map
//! keyed by conversation id plus the save time in Unix milliseconds.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};
use uketsuke_shared::time::DAY_MS;

use crate::{
    error::PersistenceError,
    model::{Conversation, Message},
};

pub type ConversationMap = BTreeMap<String, Conversation>;

/// Where the store writes through to.
pub trait ConversationPersistence: Send {
    /// Stored conversations, `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<StoredConversations>, PersistenceError>;

    fn save(&self, conversations: &ConversationMap, saved_at: i64) -> Result<(), PersistenceError>;
}

#[derive(Serialize)]
struct Envelope<'a> {
    conversations: &'a ConversationMap,
    timestamp: i64,
}

/// Conversation as read back from storage. Older records may lack
/// `sessionExpiresAt`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConversation {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub last_activity: i64,
    pub created_at: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub session_expires_at: Option<i64>,
}

fn default_active() -> bool {
    true
}

impl StoredConversation {
    /// A missing session deadline is treated as a fresh 24 hour window.
    pub fn into_conversation(self, now: i64) -> Conversation {
        Conversation {
            id: self.id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            agent_id: self.agent_id,
            agent_name: self.agent_name,
            messages: self.messages,
            last_activity: self.last_activity,
            created_at: self.created_at,
            is_active: self.is_active,
            session_expires_at: self.session_expires_at.unwrap_or(now + DAY_MS),
        }
    }
}

/// The stored record with each conversation still undecoded, so one
/// unreadable entry does not spoil the others.
#[derive(Debug, Deserialize)]
pub struct StoredConversations {
    pub conversations: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub timestamp: i64,
}

impl StoredConversations {
    /// Decode every entry on its own, keyed by conversation id.
    pub fn entries(
        self,
    ) -> impl Iterator<Item = (String, Result<StoredConversation, serde_json::Error>)> {
        self.conversations
            .into_iter()
            .map(|(id, raw)| (id, serde_json::from_value(raw)))
    }
}

fn encode(conversations: &ConversationMap, saved_at: i64) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string_pretty(&Envelope {
        conversations,
        timestamp: saved_at,
    })?)
}

/// JSON file on disk. Writes go to a sibling temp file first and are renamed
/// into place.
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ConversationPersistence for JsonFilePersistence {
    fn load(&self) -> Result<Option<StoredConversations>, PersistenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn save(&self, conversations: &ConversationMap, saved_at: i64) -> Result<(), PersistenceError> {
        let json = encode(conversations, saved_at)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

/// Keeps the serialized record in memory; nothing survives the process.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    record: Mutex<Option<String>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with a raw stored record.
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    pub fn record(&self) -> Option<String> {
        self.record
            .lock()
            .map(|record| record.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl ConversationPersistence for InMemoryPersistence {
    fn load(&self) -> Result<Option<StoredConversations>, PersistenceError> {
        self.record()
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(PersistenceError::from)
    }

    fn save(&self, conversations: &ConversationMap, saved_at: i64) -> Result<(), PersistenceError> {
        let json = encode(conversations, saved_at)?;
        match self.record.lock() {
            Ok(mut record) => *record = Some(json),
            Err(poisoned) => *poisoned.into_inner() = Some(json),
        }
        Ok(())
    }
}
