use crate::{
    ConnectionId, Metrics, ShutdownCoordinator, SubscriptionRegistry, WebSocketConnection,
};

use lq_store::ReadModelStore;

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::Response,
};
use log::{error, info};
use lq_config::Config;

/// State shared by every route and by the upgrade handler.
#[derive(Clone)]
pub struct AppState {
    pub registry: SubscriptionRegistry,
    pub store: ReadModelStore,
    pub metrics: Metrics,
    pub shutdown: ShutdownCoordinator,
    pub config: Arc<Config>,
}

/// Upgrade endpoint. Admission happens here, before the protocol
/// switch, so a refused connection is a plain HTTP 503.
pub async fn handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, StatusCode> {
    let (tx, rx) = tokio::sync::mpsc::channel(state.config.websocket.send_buffer_size);

    let connection_id = state.registry.register(tx.clone()).await.map_err(|e| {
        error!("Refusing upgrade: {e}");
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    info!("Accepted WebSocket upgrade as connection {connection_id}");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, connection_id, tx, rx, state)))
}

/// Drive one accepted socket to completion.
async fn handle_socket(
    socket: WebSocket,
    connection_id: ConnectionId,
    tx: tokio::sync::mpsc::Sender<lq_proto::ServerMessage>,
    rx: tokio::sync::mpsc::Receiver<lq_proto::ServerMessage>,
    state: AppState,
) {
    let shutdown_guard = state.shutdown.subscribe_guard();

    let connection = WebSocketConnection::new(
        connection_id,
        state.registry.clone(),
        state.store.clone(),
        state.config.websocket.clone(),
        state.config.validation,
        state.config.handler,
        state.metrics,
    );

    if let Err(e) = connection.handle(socket, tx, rx, shutdown_guard).await {
        error!("Connection {connection_id} closed with error: {e}");
    }
}
