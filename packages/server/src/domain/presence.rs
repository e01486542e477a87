//! Presence registry: who is connected, with which role, on which connection.

use std::collections::{BTreeSet, HashMap};

use super::{ConnectionId, ConnectionRecord, Identity, PresenceStatus, Role, UserId};

/// Single source of truth for reachable identities.
///
/// Invariants:
/// - an id is in `agents` or `customers` iff it has a record
/// - `by_connection` is the exact inverse of `records`
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    records: HashMap<UserId, ConnectionRecord>,
    by_connection: HashMap<ConnectionId, UserId>,
    agents: BTreeSet<UserId>,
    customers: BTreeSet<UserId>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identity` to `connection`.
    ///
    /// A later registration for the same id overwrites the earlier record; the
    /// overwritten record is returned when it lived on another connection so the
    /// caller can report it. If `connection` was registered under a different
    /// id, that stale registration is dropped first.
    pub fn register(
        &mut self,
        identity: Identity,
        connection: ConnectionId,
    ) -> Option<ConnectionRecord> {
        if let Some(previous_id) = self.by_connection.get(&connection).cloned()
            && previous_id != identity.id
        {
            self.remove_user(&previous_id);
        }

        let displaced = self
            .remove_user(&identity.id)
            .filter(|record| record.connection != connection);

        match identity.role {
            Role::Agent => self.agents.insert(identity.id.clone()),
            Role::Customer => self.customers.insert(identity.id.clone()),
        };
        self.by_connection
            .insert(connection.clone(), identity.id.clone());
        self.records.insert(
            identity.id.clone(),
            ConnectionRecord::new(connection, identity),
        );

        displaced
    }

    /// Remove whatever identity is bound to `connection`.
    ///
    /// Returns `None` for connections that never registered or whose identity
    /// has since been claimed by a newer connection.
    pub fn unregister(&mut self, connection: &ConnectionId) -> Option<Identity> {
        let user_id = self.by_connection.get(connection)?.clone();
        self.remove_user(&user_id).map(|record| record.identity)
    }

    /// Look up the live connection of a logical user.
    pub fn resolve(&self, user_id: &UserId) -> Option<&ConnectionRecord> {
        self.records.get(user_id)
    }

    /// Identity currently bound to `connection`, if any.
    pub fn identity_of(&self, connection: &ConnectionId) -> Option<&Identity> {
        self.by_connection
            .get(connection)
            .and_then(|user_id| self.records.get(user_id))
            .map(|record| &record.identity)
    }

    pub fn list_agent_ids(&self) -> Vec<UserId> {
        self.agents.iter().cloned().collect()
    }

    pub fn list_customer_ids(&self) -> Vec<UserId> {
        self.customers.iter().cloned().collect()
    }

    /// Connection records of every connected agent, ordered by agent id.
    pub fn agent_records(&self) -> impl Iterator<Item = &ConnectionRecord> {
        self.agents
            .iter()
            .filter_map(|agent_id| self.records.get(agent_id))
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Connected agents whose declared status is online.
    pub fn online_agent_count(&self) -> usize {
        self.agent_records()
            .filter(|record| record.identity.status == PresenceStatus::Online)
            .count()
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    fn remove_user(&mut self, user_id: &UserId) -> Option<ConnectionRecord> {
        let record = self.records.remove(user_id)?;
        self.by_connection.remove(&record.connection);
        self.agents.remove(user_id);
        self.customers.remove(user_id);
        Some(record)
    }
}
