//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};
use uketsuke_shared::time::{now_millis, timestamp_to_rfc3339};

use crate::{
    infrastructure::dto::http::{AvailabilityDto, PresenceDto},
    ui::state::AppState,
    usecase::CheckAvailabilityUseCase,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Whether any agent is online right now
pub async fn agent_availability(State(state): State<Arc<AppState>>) -> Json<AvailabilityDto> {
    let count = CheckAvailabilityUseCase::new(state.repository.clone())
        .online_agent_count()
        .await;

    Json(AvailabilityDto {
        success: true,
        available: count > 0,
        count,
    })
}

/// Debug view of who is online and who is typing
pub async fn presence(State(state): State<Arc<AppState>>) -> Json<PresenceDto> {
    let snapshot = state.repository.snapshot().await;

    Json(PresenceDto {
        agents: snapshot.agents.into_iter().map(|id| id.into_string()).collect(),
        customers: snapshot
            .customers
            .into_iter()
            .map(|id| id.into_string())
            .collect(),
        typing: snapshot.typing.into_iter().map(|id| id.into_string()).collect(),
        connections: snapshot.connections,
        generated_at: timestamp_to_rfc3339(now_millis()),
    })
}
