//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// ConnectionId invalid format error (not a valid UUID format)
    #[error("ConnectionId must be a valid UUID format (got: {0})")]
    ConnectionIdInvalidFormat(String),

    /// A chat message carries neither text nor media
    #[error("Message must carry text or media")]
    MessageEmpty,

    /// Role outside of customer/agent
    #[error("Unknown role: {0}")]
    UnknownRole(String),
}

/// Errors related to relay state operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The connection was never opened or has already closed
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),
}
