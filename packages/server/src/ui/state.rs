//! Server state and connection management.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::domain::RelayRepository;

/// Client connection information
pub struct ClientInfo {
    /// Outbound frame channel, drained by the socket's writer task
    pub sender: mpsc::UnboundedSender<String>,
    /// Unix timestamp when connected (milliseconds)
    pub connected_at: i64,
}

/// Shared application state
pub struct AppState {
    /// Repository（データアクセス層の抽象化）
    pub repository: Arc<dyn RelayRepository>,
    /// Quiet period of typing indicators
    pub typing_timeout: Duration,
}

impl AppState {
    pub fn new(repository: Arc<dyn RelayRepository>, typing_timeout: Duration) -> Self {
        Self {
            repository,
            typing_timeout,
        }
    }
}
