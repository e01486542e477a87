//! Message routing rules.
//!
//! - customer → agents: fan-out to every connected agent but the sender
//! - agent → customer: point-to-point, dropped when the customer is offline
//! - legacy: everyone but the sender, registered or not

use super::{
    AgentMessage, ConnectionId, CustomerMessage, Delivery, LegacyChannel, Notification,
    PresenceRegistry, Role, Timestamp,
};

pub struct MessageRouter;

impl MessageRouter {
    /// Fan a customer message out to all agents.
    ///
    /// `received_at` replaces whatever timestamp the client claimed so that
    /// every agent orders the conversation by the same clock.
    pub fn route_customer_message(
        registry: &PresenceRegistry,
        sender: &ConnectionId,
        message: CustomerMessage,
        received_at: Timestamp,
    ) -> Vec<Delivery> {
        let notification = Notification::CustomerMessage {
            customer_id: message.customer_id,
            customer_name: message.customer_name,
            text: message.body.text,
            media: message.body.media,
            timestamp: received_at,
        };

        registry
            .agent_records()
            .filter(|record| &record.connection != sender)
            .map(|record| Delivery::new(record.connection.clone(), notification.clone()))
            .collect()
    }

    /// Address an agent reply to its customer.
    ///
    /// Returns `None` when the customer is offline, or when the id resolves to
    /// something that is not a customer.
    pub fn route_agent_message(
        registry: &PresenceRegistry,
        message: AgentMessage,
        received_at: Timestamp,
    ) -> Option<Delivery> {
        let record = registry
            .resolve(&message.customer_id)
            .filter(|record| record.role() == Role::Customer)?;

        Some(Delivery::new(
            record.connection.clone(),
            Notification::AgentMessage {
                agent_id: message.agent_id,
                agent_name: message.agent_name,
                text: message.body.text,
                media: message.body.media,
                timestamp: received_at,
            },
        ))
    }

    /// Forward a legacy payload verbatim to every other open connection.
    pub fn route_legacy<'a>(
        connections: impl IntoIterator<Item = &'a ConnectionId>,
        sender: &ConnectionId,
        channel: LegacyChannel,
        payload: serde_json::Value,
    ) -> Vec<Delivery> {
        connections
            .into_iter()
            .filter(|connection| *connection != sender)
            .map(|connection| {
                Delivery::new(
                    connection.clone(),
                    Notification::Legacy {
                        channel,
                        payload: payload.clone(),
                    },
                )
            })
            .collect()
    }

    pub fn agents_available(registry: &PresenceRegistry) -> bool {
        registry.agent_count() > 0
    }
}
