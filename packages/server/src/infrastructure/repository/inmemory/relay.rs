//! In-memory relay repository.
//!
//! Holds the relay aggregate and the outbound channel of every socket behind
//! one mutex. Each trait method locks once, applies the domain operation and
//! pushes the resulting frames, so relay operations never interleave.
//!
//! ```text
//! handler ──► use case ──► RelayRepository ──► RelayState (domain)
//!                                 │
//!                                 └──► ClientInfo.sender ──► socket writer task
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::{
    sync::{Mutex, mpsc::UnboundedSender},
    task::AbortHandle,
};

use crate::{
    domain::{
        AgentMessage, ConnectionId, CustomerMessage, Delivery, DisconnectOutcome, Identity,
        LegacyChannel, PresenceSnapshot, Registered, RelayError, RelayRepository, RelayState,
        Timestamp, TypingSignal, TypingStart, UserId,
    },
    infrastructure::dto::websocket::ServerEvent,
    ui::state::ClientInfo,
};

#[derive(Default)]
struct Inner {
    clients: HashMap<ConnectionId, ClientInfo>,
    relay: RelayState,
}

impl Inner {
    /// Serialize and enqueue deliveries; returns how many were accepted.
    fn dispatch(&self, deliveries: Vec<Delivery>) -> usize {
        let mut delivered = 0;
        for delivery in deliveries {
            let Some(client) = self.clients.get(&delivery.to) else {
                tracing::debug!("Connection '{}' is gone, dropping frame", delivery.to);
                continue;
            };
            let frame = match serde_json::to_string(&ServerEvent::from(delivery.notification)) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::error!("Failed to serialize frame for '{}': {}", delivery.to, e);
                    continue;
                }
            };
            if client.sender.send(frame).is_err() {
                tracing::warn!("Failed to send frame to connection '{}'", delivery.to);
                continue;
            }
            delivered += 1;
        }
        delivered
    }
}

#[derive(Default)]
pub struct InMemoryRelayRepository {
    inner: Mutex<Inner>,
}

impl InMemoryRelayRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RelayRepository for InMemoryRelayRepository {
    async fn open_connection(
        &self,
        connection: ConnectionId,
        sender: UnboundedSender<String>,
        connected_at: Timestamp,
    ) {
        let mut inner = self.inner.lock().await;
        inner.relay.open_connection(connection.clone(), connected_at);
        inner.clients.insert(
            connection,
            ClientInfo {
                sender,
                connected_at: connected_at.value(),
            },
        );
    }

    async fn close_connection(&self, connection: &ConnectionId) -> DisconnectOutcome {
        let mut inner = self.inner.lock().await;
        inner.clients.remove(connection);
        inner.relay.disconnect(connection)
    }

    async fn register(
        &self,
        connection: &ConnectionId,
        identity: Identity,
    ) -> Result<Registered, RelayError> {
        let mut inner = self.inner.lock().await;
        let outcome = inner.relay.register(connection, identity)?;
        let delivered = inner.dispatch(outcome.deliveries);
        Ok(Registered {
            displaced: outcome.displaced,
            delivered,
        })
    }

    async fn reply_availability(&self, connection: &ConnectionId) -> Result<bool, RelayError> {
        let inner = self.inner.lock().await;
        if !inner.relay.is_open(connection) {
            return Err(RelayError::ConnectionNotFound(connection.to_string()));
        }
        let available = inner.relay.presence().agent_count() > 0;
        inner.dispatch(vec![inner.relay.availability_for(connection)]);
        Ok(available)
    }

    async fn online_agent_count(&self) -> usize {
        let inner = self.inner.lock().await;
        inner.relay.presence().online_agent_count()
    }

    async fn start_typing(&self, connection: &ConnectionId, signal: TypingSignal) -> TypingStart {
        let mut inner = self.inner.lock().await;
        let outcome = inner.relay.start_typing(connection, signal);
        inner.dispatch(outcome.deliveries);
        outcome.start
    }

    async fn arm_typing_timer(
        &self,
        user_id: &UserId,
        generation: u64,
        timer: AbortHandle,
    ) -> bool {
        let mut inner = self.inner.lock().await;
        inner.relay.arm_typing_timer(user_id, generation, timer)
    }

    async fn stop_typing(&self, user_id: &UserId) -> Option<usize> {
        let mut inner = self.inner.lock().await;
        let deliveries = inner.relay.stop_typing(user_id)?;
        Some(inner.dispatch(deliveries))
    }

    async fn expire_typing(&self, user_id: &UserId, generation: u64) -> Option<usize> {
        let mut inner = self.inner.lock().await;
        let deliveries = inner.relay.expire_typing(user_id, generation)?;
        Some(inner.dispatch(deliveries))
    }

    async fn route_customer_message(
        &self,
        sender: &ConnectionId,
        message: CustomerMessage,
        received_at: Timestamp,
    ) -> usize {
        let inner = self.inner.lock().await;
        let deliveries = inner
            .relay
            .route_customer_message(sender, message, received_at);
        inner.dispatch(deliveries)
    }

    async fn route_agent_message(&self, message: AgentMessage, received_at: Timestamp) -> bool {
        let inner = self.inner.lock().await;
        match inner.relay.route_agent_message(message, received_at) {
            Some(delivery) => inner.dispatch(vec![delivery]) == 1,
            None => false,
        }
    }

    async fn route_legacy(
        &self,
        sender: &ConnectionId,
        channel: LegacyChannel,
        payload: serde_json::Value,
    ) -> usize {
        let inner = self.inner.lock().await;
        let deliveries = inner.relay.route_legacy(sender, channel, payload);
        inner.dispatch(deliveries)
    }

    async fn snapshot(&self) -> PresenceSnapshot {
        let inner = self.inner.lock().await;
        inner.relay.snapshot()
    }
}
