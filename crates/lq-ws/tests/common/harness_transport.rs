#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum_test::{TestServer, WsMessage};
use lq_client::{
    ClientError, Result, SubscriptionTransport, TransportReceiver, TransportSender,
    TransportSession,
};
use lq_proto::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;

/// Drives the client SDK against an in-process test server.
///
/// Each `connect` performs a real WebSocket upgrade; a pump task owns the
/// socket and bridges it to the typed transport halves.
pub struct HarnessTransport {
    server: Arc<TestServer>,
}

impl HarnessTransport {
    pub fn new(server: Arc<TestServer>) -> Self {
        Self { server }
    }
}

#[async_trait]
impl SubscriptionTransport for HarnessTransport {
    async fn connect(&self) -> Result<TransportSession> {
        let mut ws = self.server.get_websocket("/ws").await.into_websocket().await;

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Result<ServerMessage>>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = outbound_rx.recv() => match frame {
                        Some(message) => match message.encode() {
                            Ok(text) => ws.send_text(text).await,
                            Err(error) => {
                                let _ = inbound_tx
                                    .send(Err(ClientError::transport(error.to_string())));
                            }
                        },
                        None => {
                            // Sender dropped: orderly close
                            ws.close().await;
                            break;
                        }
                    },
                    message = ws.receive_message() => match message {
                        WsMessage::Text(text) => {
                            let frame = ServerMessage::decode(text.as_str())
                                .map_err(|error| ClientError::transport(error.to_string()));
                            if inbound_tx.send(frame).is_err() {
                                break;
                            }
                        }
                        WsMessage::Close(_) => break,
                        _ => {}
                    },
                }
            }
        });

        Ok(TransportSession {
            sender: Box::new(HarnessSender { frames: outbound_tx }),
            receiver: Box::new(HarnessReceiver { frames: inbound_rx }),
        })
    }
}

struct HarnessSender {
    frames: mpsc::UnboundedSender<ClientMessage>,
}

#[async_trait]
impl TransportSender for HarnessSender {
    async fn send(&mut self, message: ClientMessage) -> Result<()> {
        self.frames
            .send(message)
            .map_err(|_| ClientError::connection_lost())
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the sender closes the socket via the pump
        Ok(())
    }
}

struct HarnessReceiver {
    frames: mpsc::UnboundedReceiver<Result<ServerMessage>>,
}

#[async_trait]
impl TransportReceiver for HarnessReceiver {
    async fn receive(&mut self) -> Option<Result<ServerMessage>> {
        self.frames.recv().await
    }
}
