//! Handler modules for HTTP and WebSocket endpoints.

pub mod http;
pub mod websocket;

// Re-export HTTP handlers
pub use http::{agent_availability, health_check, presence};

// Re-export WebSocket handlers
pub use websocket::websocket_handler;
