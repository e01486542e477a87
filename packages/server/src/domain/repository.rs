//! Repository trait for relay state.
//!
//! Each method is one atomic relay operation: the implementation applies it
//! to the relay state and pushes the resulting deliveries to the affected
//! connections before anything else can run.

use async_trait::async_trait;
use tokio::{sync::mpsc::UnboundedSender, task::AbortHandle};

use super::{
    AgentMessage, ConnectionId, ConnectionRecord, CustomerMessage, DisconnectOutcome,
    LegacyChannel, PresenceSnapshot, RelayError, Timestamp, TypingSignal, TypingStart, UserId,
    Identity,
};

/// Result of a registration as seen by the use case layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub displaced: Option<ConnectionRecord>,
    pub delivered: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RelayRepository: Send + Sync {
    /// Track a freshly upgraded socket and its outbound channel.
    async fn open_connection(
        &self,
        connection: ConnectionId,
        sender: UnboundedSender<String>,
        connected_at: Timestamp,
    );

    /// Forget a socket and cascade presence/typing cleanup.
    async fn close_connection(&self, connection: &ConnectionId) -> DisconnectOutcome;

    async fn register(
        &self,
        connection: &ConnectionId,
        identity: Identity,
    ) -> Result<Registered, RelayError>;

    /// Send the availability reply to `connection`; returns the availability.
    async fn reply_availability(&self, connection: &ConnectionId) -> Result<bool, RelayError>;

    /// Agents that are connected and not marked busy or offline.
    async fn online_agent_count(&self) -> usize;

    async fn start_typing(
        &self,
        connection: &ConnectionId,
        signal: TypingSignal,
    ) -> TypingStart;

    async fn arm_typing_timer(&self, user_id: &UserId, generation: u64, timer: AbortHandle)
    -> bool;

    /// `None` when the user was not typing, else the number of notified connections.
    async fn stop_typing(&self, user_id: &UserId) -> Option<usize>;

    /// `None` when the generation is stale, else the number of notified connections.
    async fn expire_typing(&self, user_id: &UserId, generation: u64) -> Option<usize>;

    /// Returns the number of agents the message reached.
    async fn route_customer_message(
        &self,
        sender: &ConnectionId,
        message: CustomerMessage,
        received_at: Timestamp,
    ) -> usize;

    /// Returns whether the customer was reachable.
    async fn route_agent_message(&self, message: AgentMessage, received_at: Timestamp) -> bool;

    async fn route_legacy(
        &self,
        sender: &ConnectionId,
        channel: LegacyChannel,
        payload: serde_json::Value,
    ) -> usize;

    async fn snapshot(&self) -> PresenceSnapshot;
}
