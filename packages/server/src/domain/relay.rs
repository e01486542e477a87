//! Relay aggregate: open connections, presence and typing state.
//!
//! All mutation goes through `&mut RelayState`, so whoever owns the value
//! (the in-memory repository, behind one lock) is the single writer. Every
//! operation returns the deliveries it caused instead of performing I/O.

use std::collections::BTreeMap;

use tokio::task::AbortHandle;

use super::{
    AgentMessage, ConnectionId, ConnectionRecord, CustomerMessage, Delivery, Identity,
    LegacyChannel, MessageRouter, Notification, PresenceRegistry, RelayError, Role, Timestamp,
    TypingSignal, TypingStart, TypingState, TypingTracker, UserId,
};

/// Outcome of a registration signal
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterOutcome {
    /// Record that lived on another connection under the same id
    pub displaced: Option<ConnectionRecord>,
    /// Availability reply for customers
    pub deliveries: Vec<Delivery>,
}

/// Outcome of a disconnect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub identity: Option<Identity>,
    pub typing_cancelled: bool,
}

/// Outcome of a typing start signal
#[derive(Debug, Clone, PartialEq)]
pub struct TypingStartOutcome {
    pub start: TypingStart,
    pub deliveries: Vec<Delivery>,
}

/// Read-only view used by the debug endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub agents: Vec<UserId>,
    pub customers: Vec<UserId>,
    pub typing: Vec<UserId>,
    pub connections: usize,
}

#[derive(Debug, Default)]
pub struct RelayState {
    /// Every open socket, registered or not, with its open time
    connections: BTreeMap<ConnectionId, Timestamp>,
    presence: PresenceRegistry,
    typing: TypingTracker,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_connection(&mut self, connection: ConnectionId, connected_at: Timestamp) {
        self.connections.insert(connection, connected_at);
    }

    pub fn is_open(&self, connection: &ConnectionId) -> bool {
        self.connections.contains_key(connection)
    }

    /// Bind an identity to an open connection.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ConnectionNotFound` if the connection is not open
    pub fn register(
        &mut self,
        connection: &ConnectionId,
        identity: Identity,
    ) -> Result<RegisterOutcome, RelayError> {
        self.ensure_open(connection)?;

        let role = identity.role;
        let displaced = self.presence.register(identity, connection.clone());

        let deliveries = match role {
            Role::Customer => vec![self.availability_for(connection)],
            Role::Agent => Vec::new(),
        };

        Ok(RegisterOutcome {
            displaced,
            deliveries,
        })
    }

    /// Close a connection and cascade cleanup.
    ///
    /// Unregisters the bound identity (if this connection still owns it) and
    /// silently cancels its typing timer.
    pub fn disconnect(&mut self, connection: &ConnectionId) -> DisconnectOutcome {
        self.connections.remove(connection);
        let identity = self.presence.unregister(connection);
        let typing_cancelled = identity
            .as_ref()
            .is_some_and(|identity| self.typing.cancel(&identity.id));

        DisconnectOutcome {
            identity,
            typing_cancelled,
        }
    }

    /// Availability reply for one connection.
    pub fn availability_for(&self, connection: &ConnectionId) -> Delivery {
        Delivery::new(
            connection.clone(),
            Notification::AgentAvailability {
                available: MessageRouter::agents_available(&self.presence),
            },
        )
    }

    /// Handle a typing start signal coming from `connection`.
    pub fn start_typing(
        &mut self,
        connection: &ConnectionId,
        signal: TypingSignal,
    ) -> TypingStartOutcome {
        let user_id = signal.user_id.clone();
        let user_name = signal.user_name.clone();
        let role = signal.role;
        let target_id = signal.target_id.clone();

        let start = self.typing.start(signal, connection.clone());

        let mut deliveries = Vec::new();
        if let TypingStart::Retargeted {
            previous_role,
            previous_target,
            previous_connection,
            ..
        } = &start
        {
            deliveries.extend(self.stopped_deliveries(
                &user_id,
                *previous_role,
                previous_target.as_ref(),
                previous_connection,
            ));
        }

        if !matches!(start, TypingStart::Renewed { .. }) {
            let audience =
                TypingTracker::audience(&self.presence, role, target_id.as_ref(), connection);
            deliveries.extend(audience.into_iter().map(|to| {
                Delivery::new(
                    to,
                    Notification::UserTyping {
                        user_id: user_id.clone(),
                        user_name: user_name.clone(),
                        role,
                    },
                )
            }));
        }

        TypingStartOutcome { start, deliveries }
    }

    pub fn arm_typing_timer(
        &mut self,
        user_id: &UserId,
        generation: u64,
        timer: AbortHandle,
    ) -> bool {
        self.typing.arm(user_id, generation, timer)
    }

    /// Explicit stop. `None` when the user was not typing.
    pub fn stop_typing(&mut self, user_id: &UserId) -> Option<Vec<Delivery>> {
        let state = self.typing.stop(user_id)?;
        Some(self.stopped_deliveries_for(user_id, &state))
    }

    /// Timer expiry. `None` when the generation is stale or the user is gone.
    pub fn expire_typing(&mut self, user_id: &UserId, generation: u64) -> Option<Vec<Delivery>> {
        let state = self.typing.expire(user_id, generation)?;
        Some(self.stopped_deliveries_for(user_id, &state))
    }

    pub fn route_customer_message(
        &self,
        sender: &ConnectionId,
        message: CustomerMessage,
        received_at: Timestamp,
    ) -> Vec<Delivery> {
        MessageRouter::route_customer_message(&self.presence, sender, message, received_at)
    }

    pub fn route_agent_message(
        &self,
        message: AgentMessage,
        received_at: Timestamp,
    ) -> Option<Delivery> {
        MessageRouter::route_agent_message(&self.presence, message, received_at)
    }

    pub fn route_legacy(
        &self,
        sender: &ConnectionId,
        channel: LegacyChannel,
        payload: serde_json::Value,
    ) -> Vec<Delivery> {
        MessageRouter::route_legacy(self.connections.keys(), sender, channel, payload)
    }

    pub fn presence(&self) -> &PresenceRegistry {
        &self.presence
    }

    pub fn typing(&self) -> &TypingTracker {
        &self.typing
    }

    pub fn snapshot(&self) -> PresenceSnapshot {
        PresenceSnapshot {
            agents: self.presence.list_agent_ids(),
            customers: self.presence.list_customer_ids(),
            typing: self.typing.typing_user_ids(),
            connections: self.connections.len(),
        }
    }

    fn ensure_open(&self, connection: &ConnectionId) -> Result<(), RelayError> {
        if self.is_open(connection) {
            Ok(())
        } else {
            Err(RelayError::ConnectionNotFound(connection.to_string()))
        }
    }

    fn stopped_deliveries_for(&self, user_id: &UserId, state: &TypingState) -> Vec<Delivery> {
        self.stopped_deliveries(
            user_id,
            state.role,
            state.target_id.as_ref(),
            &state.connection,
        )
    }

    fn stopped_deliveries(
        &self,
        user_id: &UserId,
        role: Role,
        target_id: Option<&UserId>,
        typist_connection: &ConnectionId,
    ) -> Vec<Delivery> {
        TypingTracker::audience(&self.presence, role, target_id, typist_connection)
            .into_iter()
            .map(|to| {
                Delivery::new(
                    to,
                    Notification::UserStoppedTyping {
                        user_id: user_id.clone(),
                    },
                )
            })
            .collect()
    }
}
