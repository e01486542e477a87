//! Interactive client for the support relay.
//!
//! Keeps a locally persisted, self-expiring store of conversations and
//! talks to the relay over WebSocket.

pub mod app;
pub mod config;
pub mod error;
pub mod model;
pub mod persistence;
pub mod relay;
pub mod scheduler;
pub mod session;
pub mod store;

// Re-export entry points
pub use app::run as run_client;
pub use config::ClientConfig;
