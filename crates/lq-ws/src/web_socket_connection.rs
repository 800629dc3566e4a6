use crate::{
    ConnectionId, HandlerContext, Metrics, Result as WsErrorResult, ShutdownGuard,
    SubscriptionRegistry, WsError, dispatch,
};

use lq_proto::{ClientMessage, CompleteReason, ErrorCode, ServerMessage};
use lq_store::ReadModelStore;

use std::panic::Location;
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket};
use error_location::ErrorLocation;
use futures::{SinkExt, StreamExt};
use lq_config::{HandlerConfig, ValidationConfig, WebSocketConfig};
use tokio::sync::mpsc;

/// Manages a single WebSocket connection
pub struct WebSocketConnection {
    connection_id: ConnectionId,
    registry: SubscriptionRegistry,
    store: ReadModelStore,
    websocket: WebSocketConfig,
    validation: ValidationConfig,
    handler: HandlerConfig,
    metrics: Metrics,
}

impl WebSocketConnection {
    pub fn new(
        connection_id: ConnectionId,
        registry: SubscriptionRegistry,
        store: ReadModelStore,
        websocket: WebSocketConfig,
        validation: ValidationConfig,
        handler: HandlerConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            connection_id,
            registry,
            store,
            websocket,
            validation,
            handler,
            metrics,
        }
    }

    /// Handle the WebSocket connection lifecycle.
    ///
    /// `outbound` is the channel the registry fans deliveries into; this
    /// task owns its receiving end and is the only writer to the socket, so
    /// handler responses and deliveries leave in one serialized stream.
    /// Unregistration runs on every exit path.
    pub async fn handle(
        self,
        socket: WebSocket,
        tx: mpsc::Sender<ServerMessage>,
        outbound: mpsc::Receiver<ServerMessage>,
        mut shutdown_guard: ShutdownGuard,
    ) -> WsErrorResult<()> {
        log::info!("WebSocket connection {} established", self.connection_id);
        self.metrics.connection_established();

        let (ws_sender, ws_receiver) = socket.split();
        let send_task = self.spawn_send_task(ws_sender, outbound);

        let result = self.run(ws_receiver, &tx, &mut shutdown_guard).await;

        // Cleanup: cascade-terminate subscriptions, then release our
        // sender so the send task drains queued frames and exits.
        let terminated = self.registry.unregister(self.connection_id).await;
        self.metrics.subscriptions_closed(terminated, "disconnect");
        drop(tx);
        let _ = send_task.await;

        self.metrics
            .connection_closed(if result.is_ok() { "normal" } else { "error" });
        log::info!(
            "WebSocket connection {} closed ({terminated} subscription(s) terminated)",
            self.connection_id
        );

        result
    }

    fn spawn_send_task(
        &self,
        mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
        mut outbound: mpsc::Receiver<ServerMessage>,
    ) -> tokio::task::JoinHandle<()> {
        let connection_id = self.connection_id;
        let metrics = self.metrics;

        tokio::spawn(async move {
            while let Some(frame) = outbound.recv().await {
                let kind = frame.kind();
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        log::error!("Failed to encode {kind} frame for {connection_id}: {e}");
                        continue;
                    }
                };
                if ws_sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
                metrics.message_sent(kind);
            }
        })
    }

    async fn run(
        &self,
        mut ws_receiver: futures::stream::SplitStream<WebSocket>,
        tx: &mpsc::Sender<ServerMessage>,
        shutdown_guard: &mut ShutdownGuard,
    ) -> WsErrorResult<()> {
        let mut liveness =
            tokio::time::interval(Duration::from_secs(self.websocket.heartbeat_interval_secs));
        liveness.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let idle_limit = Duration::from_secs(self.websocket.heartbeat_timeout_secs);
        let mut last_received = Instant::now();

        loop {
            tokio::select! {
                // Incoming frames from the client
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(msg)) => {
                            last_received = Instant::now();
                            if let Err(e) = self.handle_frame(msg, tx).await {
                                log::error!(
                                    "Error handling message from connection {}: {e}",
                                    self.connection_id
                                );
                                self.metrics.error_occurred("message_handling");
                                return Err(e);
                            }
                        }
                        Some(Err(e)) => {
                            log::warn!(
                                "WebSocket error on connection {}: {e}",
                                self.connection_id
                            );
                            return Err(WsError::ConnectionClosed {
                                reason: format!("WebSocket error: {e}"),
                                location: ErrorLocation::from(Location::caller()),
                            });
                        }
                        None => {
                            log::info!("Connection {} closed by client", self.connection_id);
                            return Ok(());
                        }
                    }
                }

                // Idle connections are reaped; protocol pings keep them live
                _ = liveness.tick() => {
                    if last_received.elapsed() >= idle_limit {
                        log::warn!(
                            "Connection {} idle for over {}s, closing",
                            self.connection_id,
                            self.websocket.heartbeat_timeout_secs
                        );
                        return Err(WsError::HeartbeatTimeout {
                            timeout_secs: self.websocket.heartbeat_timeout_secs,
                            location: ErrorLocation::from(Location::caller()),
                        });
                    }
                }

                // Graceful shutdown: complete every subscription, then close
                _ = shutdown_guard.wait() => {
                    log::info!("Shutting down connection {} gracefully", self.connection_id);
                    self.complete_all(tx, CompleteReason::Shutdown).await;
                    return Ok(());
                }
            }
        }
    }

    /// Handle one frame from the client
    async fn handle_frame(
        &self,
        msg: Message,
        tx: &mpsc::Sender<ServerMessage>,
    ) -> WsErrorResult<()> {
        match msg {
            Message::Text(text) => self.handle_text(text.as_str(), tx).await,
            Message::Binary(data) => {
                log::debug!(
                    "Ignoring binary frame ({} bytes) on connection {}: protocol is JSON text",
                    data.len(),
                    self.connection_id
                );
                Ok(())
            }
            // Ping frames are answered by the library
            Message::Ping(_) | Message::Pong(_) => Ok(()),
            Message::Close(_) => {
                log::info!("Received close frame from connection {}", self.connection_id);
                Ok(())
            }
        }
    }

    /// Decode and dispatch one text frame. Decode failures answer with an
    /// error frame and keep the connection open.
    async fn handle_text(&self, text: &str, tx: &mpsc::Sender<ServerMessage>) -> WsErrorResult<()> {
        let msg = match ClientMessage::decode(text) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!(
                    "Undecodable frame on connection {}: {e}",
                    self.connection_id
                );
                self.metrics.message_received("invalid");
                self.metrics.error_occurred("decode");
                let frame = ServerMessage::error(None, ErrorCode::DecodeError, e.to_string());
                return self.send(tx, frame).await;
            }
        };

        self.metrics.message_received(msg.kind());

        let ctx = HandlerContext::new(
            self.connection_id,
            self.registry.clone(),
            self.store.clone(),
            tx.clone(),
            self.metrics,
            self.validation,
            self.handler,
            msg.operation_id(),
        );

        let timer = self.metrics.latency_timer();
        let response = dispatch(msg, ctx).await;
        timer.finish();

        match response {
            Some(frame) => self.send(tx, frame).await,
            None => Ok(()),
        }
    }

    async fn send(&self, tx: &mpsc::Sender<ServerMessage>, frame: ServerMessage) -> WsErrorResult<()> {
        tx.send(frame).await.map_err(|_| WsError::ConnectionClosed {
            reason: "outbound channel closed".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Send a complete frame for every live subscription on this connection.
    async fn complete_all(&self, tx: &mpsc::Sender<ServerMessage>, reason: CompleteReason) {
        for key in self.registry.operation_keys(self.connection_id).await {
            let frame = ServerMessage::Complete { id: key, reason };
            if tx.send(frame).await.is_err() {
                break;
            }
        }
    }
}
