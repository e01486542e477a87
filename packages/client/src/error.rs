//! Client error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid stored conversations: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to relay: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("terminal error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
    #[error("invalid identity: {0}")]
    Identity(#[from] uketsuke_server::domain::ValueObjectError),
    #[error("relay connection closed")]
    Disconnected,
}

/// Rejected command line input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '/{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("only agents can use '/{0}'")]
    AgentOnly(&'static str),
    #[error("no active conversation, pick one with /to <customerId>")]
    NoActiveConversation,
    #[error("message is empty")]
    EmptyMessage,
}
