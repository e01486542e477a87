//! Command line configuration of the chat client.

use std::path::PathBuf;

use clap::Parser;
use uketsuke_server::domain::Role;

#[derive(Debug, Clone, Parser)]
#[command(name = "uketsuke-client", version, about = "Customer-support live chat client")]
pub struct ClientConfig {
    /// Relay WebSocket URL
    #[arg(long, default_value = "ws://127.0.0.1:3005/ws")]
    pub url: String,

    /// User id to register with (random when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Display name (defaults to the user id)
    #[arg(long)]
    pub name: Option<String>,

    /// customer or agent
    #[arg(long, default_value = "customer")]
    pub role: Role,

    /// JSON file holding persisted conversations
    #[arg(long, default_value = "uketsuke_conversations.json")]
    pub store: PathBuf,

    /// Keep conversations in memory only
    #[arg(long)]
    pub ephemeral: bool,

    /// Default log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl ClientConfig {
    pub fn user_id(&self) -> String {
        self.id.clone().unwrap_or_else(|| {
            let suffix = uuid::Uuid::new_v4().simple().to_string();
            format!("{}-{}", self.role, &suffix[..8])
        })
    }
}
