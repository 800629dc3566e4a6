use crate::{admin, health};

use lq_ws::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};

/// Assemble the HTTP surface: the realtime upgrade endpoint plus health,
/// admin and Prometheus routes around it.
///
/// CORS stays wide open so browser clients can connect from any origin.
pub fn build_router(state: AppState, metrics_handle: PrometheusHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(lq_ws::handler))
        .route("/health", get(health::health))
        .route("/live", get(health::liveness))
        .route("/ready", get(health::readiness))
        .route("/admin/stats", get(admin::stats_handler))
        .route("/admin/shutdown", post(admin::shutdown_handler))
        .route("/metrics", get(move || async move { metrics_handle.render() }))
        .with_state(state)
        .layer(cors)
}
