//! Realtime relay for customer-support live chat.
//!
//! Tracks which customers and agents are online, relays customer messages to
//! every agent and agent replies to one customer, and debounces typing
//! indicators.

pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// Re-export entry points
pub use config::ServerConfig;
pub use error::ServerError;
pub use ui::run as run_server;
