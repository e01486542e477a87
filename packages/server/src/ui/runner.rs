//! Router construction and the serve loop.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig, error::ServerError,
    infrastructure::repository::InMemoryRelayRepository,
};

use super::{
    handler::{agent_availability, health_check, presence, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/api/health", get(health_check))
        .route("/api/agents/availability", get(agent_availability))
        .route("/api/presence", get(presence))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let repository = Arc::new(InMemoryRelayRepository::new());
    let state = Arc::new(AppState::new(repository, config.typing_timeout()));

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

    tracing::info!("Relay listening on ws://{}/ws", addr);
    tracing::info!(
        "Typing indicators stop after {} ms of silence",
        config.typing_timeout_ms
    );

    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("Relay stopped");
    Ok(())
}
