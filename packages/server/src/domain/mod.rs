//! Domain layer for the support relay.
//!
//! This module contains the presence, typing and routing rules. It is
//! independent of data transfer objects (DTOs) and of the WebSocket transport.

pub mod entity;
pub mod error;
pub mod factory;
pub mod notification;
pub mod presence;
pub mod relay;
pub mod repository;
pub mod routing;
pub mod typing;
pub mod value_object;

pub use entity::{
    AgentMessage, ConnectionRecord, CustomerMessage, Identity, MediaAttachment, MessageBody,
    TypingSignal,
};
pub use error::{RelayError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use notification::{Delivery, LegacyChannel, Notification};
pub use presence::PresenceRegistry;
pub use relay::{
    DisconnectOutcome, PresenceSnapshot, RegisterOutcome, RelayState, TypingStartOutcome,
};
pub use repository::{Registered, RelayRepository};
#[cfg(test)]
pub use repository::MockRelayRepository;
pub use routing::MessageRouter;
pub use typing::{DEFAULT_TYPING_TIMEOUT, TypingStart, TypingState, TypingTracker};
pub use value_object::{
    ConnectionId, DisplayName, MessageText, PresenceStatus, Role, Timestamp, UserId,
};
