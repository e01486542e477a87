//! WebSocket link to the relay.
//!
//! A writer task serializes outbound events and a reader task decodes
//! inbound frames. Frames the client does not understand are logged and
//! skipped.

use futures_util::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uketsuke_server::infrastructure::dto::websocket::{ClientEvent, ServerEvent};

use crate::error::ClientError;

pub struct RelayLink {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    writer: JoinHandle<()>,
    reader: JoinHandle<()>,
}

impl RelayLink {
    /// Connect to `url`; returns the link and the stream of relayed events.
    pub async fn connect(
        url: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ServerEvent>), ClientError> {
        let (stream, _) = connect_async(url).await?;
        tracing::info!("Connected to relay at {}", url);
        let (mut sink, mut source) = stream.split();

        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientEvent>();
        let (inbound_tx, inbound) = mpsc::unbounded_channel::<ServerEvent>();

        let writer = tokio::spawn(async move {
            while let Some(event) = outbound_rx.recv().await {
                let frame = match serde_json::to_string(&event) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!("Failed to serialize event: {}", e);
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    tracing::warn!("Failed to send frame: {}", e);
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let reader = tokio::spawn(async move {
            while let Some(message) = source.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerEvent>(text.as_str()) {
                            Ok(event) => {
                                if inbound_tx.send(event).is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Skipping unknown frame: {}", e),
                        }
                    }
                    Ok(Message::Close(_)) => {
                        tracing::info!("Relay closed the connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        });

        Ok((
            Self {
                outbound,
                writer,
                reader,
            },
            inbound,
        ))
    }

    pub fn send(&self, event: ClientEvent) -> Result<(), ClientError> {
        self.outbound
            .send(event)
            .map_err(|_| ClientError::Disconnected)
    }

    /// Flush queued frames and close the socket.
    pub async fn close(self) {
        drop(self.outbound);
        let _ = self.writer.await;
        self.reader.abort();
    }
}
