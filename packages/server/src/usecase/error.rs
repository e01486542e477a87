//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::RelayError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("connection '{0}' is already closed")]
    ConnectionClosed(String),
}

impl From<RelayError> for RegisterError {
    fn from(error: RelayError) -> Self {
        match error {
            RelayError::ConnectionNotFound(connection) => {
                RegisterError::ConnectionClosed(connection)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendMessageError {
    /// The addressed customer has no live connection; the message is dropped
    #[error("customer '{0}' is not connected")]
    RecipientOffline(String),
}
