//! HTTP API response DTOs for the support relay.

use serde::{Deserialize, Serialize};

/// Agent availability, shaped like the availability route of the web app
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityDto {
    pub success: bool,
    pub available: bool,
    pub count: usize,
}

/// Debug view of relay presence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceDto {
    pub agents: Vec<String>,
    pub customers: Vec<String>,
    pub typing: Vec<String>,
    pub connections: usize,
    pub generated_at: String, // ISO 8601
}
