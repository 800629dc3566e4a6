use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lq_ws::AppState;
use serde_json::json;

/// GET /health - status page with live registry occupancy
pub async fn health(State(state): State<AppState>) -> Response {
    let report = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "realtime": {
            "connections": state.registry.connection_count().await,
            "subscriptions": state.registry.subscription_count().await,
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (StatusCode::OK, Json(report)).into_response()
}

/// GET /live - answers as long as the process can serve a request
pub async fn liveness() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// GET /ready - traffic readiness
pub async fn readiness() -> Response {
    // Registry, store and dispatcher are wired before the listener binds,
    // so a serving router means the realtime pipeline is up
    (StatusCode::OK, "Ready").into_response()
}
