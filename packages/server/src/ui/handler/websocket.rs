//! WebSocket connection handlers.
//!
//! One reader task decodes client events and calls the use cases; one writer
//! task drains the connection's outbound channel. When either side finishes
//! the other is aborted and the connection is torn down.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{
        AgentMessage, ConnectionId, CustomerMessage, Identity, LegacyChannel, TypingSignal, UserId,
    },
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
    usecase::{
        CheckAvailabilityUseCase, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        RegisterParticipantUseCase, SendMessageError, SendMessageUseCase, TypingIndicatorUseCase,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive frames
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection = ConnectParticipantUseCase::new(state.repository.clone())
        .execute(tx)
        .await;
    tracing::info!("Connection '{}' opened", connection);

    let reader_connection = connection.clone();
    let reader_state = state.clone();

    // Spawn a task to receive events from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", reader_connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    handle_event(&reader_state, &reader_connection, text.as_str()).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", reader_connection);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push relayed frames to this connection
    let mut send_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    DisconnectParticipantUseCase::new(state.repository.clone())
        .execute(&connection)
        .await;
}

/// Decode one text frame and dispatch it. Malformed or invalid input is
/// logged and dropped; nothing is sent back.
async fn handle_event(state: &AppState, connection: &ConnectionId, text: &str) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("Dropping malformed frame from '{}': {}", connection, e);
            return;
        }
    };

    match event {
        ClientEvent::UserConnected(payload) => {
            let identity = match Identity::try_from(payload) {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!("Invalid registration from '{}': {}", connection, e);
                    return;
                }
            };
            if let Err(e) = RegisterParticipantUseCase::new(state.repository.clone())
                .execute(connection, identity)
                .await
            {
                tracing::warn!("Registration failed: {}", e);
            }
        }
        ClientEvent::TypingStart(payload) => {
            let signal = match TypingSignal::try_from(payload) {
                Ok(signal) => signal,
                Err(e) => {
                    tracing::warn!("Invalid typing_start from '{}': {}", connection, e);
                    return;
                }
            };
            TypingIndicatorUseCase::new(state.repository.clone(), state.typing_timeout)
                .start(connection, signal)
                .await;
        }
        ClientEvent::TypingStop(payload) => {
            let user_id = match UserId::new(payload.user_id) {
                Ok(user_id) => user_id,
                Err(e) => {
                    tracing::warn!("Invalid typing_stop from '{}': {}", connection, e);
                    return;
                }
            };
            TypingIndicatorUseCase::new(state.repository.clone(), state.typing_timeout)
                .stop(&user_id)
                .await;
        }
        ClientEvent::CustomerMessage(payload) => {
            let message = match CustomerMessage::try_from(payload) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Dropping customer_message from '{}': {}", connection, e);
                    return;
                }
            };
            SendMessageUseCase::new(state.repository.clone())
                .send_customer_message(connection, message)
                .await;
        }
        ClientEvent::AgentMessage(payload) => {
            let message = match AgentMessage::try_from(payload) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Dropping agent_message from '{}': {}", connection, e);
                    return;
                }
            };
            match SendMessageUseCase::new(state.repository.clone())
                .send_agent_message(message)
                .await
            {
                Ok(()) => {}
                Err(SendMessageError::RecipientOffline(customer_id)) => {
                    tracing::debug!("Customer '{}' is offline, agent message dropped", customer_id);
                }
            }
        }
        ClientEvent::CheckAgentAvailability => {
            if let Err(e) = CheckAvailabilityUseCase::new(state.repository.clone())
                .reply(connection)
                .await
            {
                tracing::warn!("Availability reply failed: {}", e);
            }
        }
        ClientEvent::LegacyChat(payload) => {
            SendMessageUseCase::new(state.repository.clone())
                .broadcast_legacy(connection, LegacyChannel::Chat, payload)
                .await;
        }
        ClientEvent::LegacyMedia(payload) => {
            SendMessageUseCase::new(state.repository.clone())
                .broadcast_legacy(connection, LegacyChannel::Media, payload)
                .await;
        }
    }
}
