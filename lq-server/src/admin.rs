//! Operator endpoints under `/admin`.

use axum::{Json, extract::State, http::StatusCode};
use log::info;
use lq_ws::AppState;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub connections: usize,
    pub subscriptions: usize,
}

/// Current registry occupancy.
///
/// `connections` counts open connections, `subscriptions` counts entries
/// across all of them. Cascade-terminated entries are already gone by the
/// time they could be observed here.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        connections: state.registry.connection_count().await,
        subscriptions: state.registry.subscription_count().await,
    })
}

/// Remote shutdown.
///
/// Trips the shutdown coordinator. Connections send their Complete frames,
/// the dispatcher stops, and the serve loop drains before the process exits.
pub async fn shutdown_handler(State(state): State<AppState>) -> StatusCode {
    info!("Shutdown requested through /admin/shutdown");

    state.shutdown.shutdown();

    StatusCode::ACCEPTED
}
