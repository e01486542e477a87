//! Shared fixtures for integration tests.
//!
//! `TestServer` runs the relay in-process on an ephemeral port and shuts it
//! down when dropped. `TestClient` is a thin JSON-frame WebSocket client.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::{net::TcpStream, sync::oneshot};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use uketsuke_server::{
    infrastructure::repository::InMemoryRelayRepository,
    ui::{AppState, serve},
};

const EVENT_TIMEOUT: Duration = Duration::from_secs(3);

pub struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_typing_timeout(Duration::from_millis(3000)).await
    }

    pub async fn with_typing_timeout(typing_timeout: Duration) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let state = Arc::new(AppState::new(
            Arc::new(InMemoryRelayRepository::new()),
            typing_timeout,
        ));
        let (tx, rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            serve(listener, state, shutdown)
                .await
                .expect("Test server failed");
        });

        Self {
            addr,
            shutdown: Some(tx),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub async fn get_json(&self, path: &str) -> Value {
        reqwest::get(format!("{}{}", self.base_url(), path))
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (stream, _) = connect_async(server.ws_url())
            .await
            .expect("Failed to connect");
        Self { stream }
    }

    /// Connect and register; returns once the relay has processed the registration.
    pub async fn register(server: &TestServer, id: &str, name: &str, role: &str) -> Self {
        let mut client = Self::connect(server).await;
        client
            .emit("user_connected", json!({"id": id, "name": name, "role": role}))
            .await;
        if role == "customer" {
            let reply = client.next_event().await;
            assert_eq!(reply["event"], "agent_availability");
        } else {
            client.sync().await;
        }
        client
    }

    pub async fn emit(&mut self, event: &str, data: Value) {
        self.send_raw(json!({"event": event, "data": data}).to_string())
            .await;
    }

    pub async fn send_raw(&mut self, text: String) {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .expect("Failed to send frame");
    }

    /// Next JSON text frame, failing the test after a timeout.
    pub async fn next_event(&mut self) -> Value {
        tokio::time::timeout(EVENT_TIMEOUT, self.next_text())
            .await
            .expect("Timed out waiting for an event")
            .expect("Connection closed")
    }

    /// Assert that no text frame arrives within `window`.
    pub async fn expect_silence(&mut self, window: Duration) {
        if let Ok(Some(frame)) = tokio::time::timeout(window, self.next_text()).await {
            panic!("Expected no event, got {frame}");
        }
    }

    /// Round-trip an availability query. Frames on one connection are handled
    /// in order, so every earlier event from this client has been processed.
    pub async fn sync(&mut self) -> bool {
        self.send_raw(json!({"event": "check_agent_availability"}).to_string())
            .await;
        let reply = self.next_event().await;
        assert_eq!(reply["event"], "agent_availability");
        reply["data"]["available"].as_bool().expect("available flag")
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }

    async fn next_text(&mut self) -> Option<Value> {
        while let Some(message) = self.stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    return Some(serde_json::from_str(text.as_str()).expect("Invalid JSON frame"));
                }
                Ok(Message::Close(_)) | Err(_) => return None,
                Ok(_) => continue,
            }
        }
        None
    }
}
