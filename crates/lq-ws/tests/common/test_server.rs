#![allow(dead_code)]

use lq_config::Config;
use lq_store::ReadModelStore;
use lq_ws::{AppState, EventDispatcher, Metrics, ShutdownCoordinator, SubscriptionRegistry};

use std::sync::Arc;

use axum::{Router, routing::get};
use axum_test::TestServer;

/// Limits under test. Defaults are roomy enough for the happy paths.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub max_connections: usize,
    pub max_subscriptions_per_connection: usize,
    pub send_buffer_size: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            max_connections: 100,
            max_subscriptions_per_connection: 16,
            send_buffer_size: 64,
        }
    }
}

impl HarnessConfig {
    /// Tight limits for admission tests: two connections, one
    /// subscription each.
    pub fn strict() -> Self {
        Self {
            max_connections: 2,
            max_subscriptions_per_connection: 1,
            ..Default::default()
        }
    }
}

/// In-process server plus the state behind it, so tests can assert on
/// registry counts directly.
pub struct TestHarness {
    pub server: TestServer,
    pub state: AppState,
}

pub fn harness() -> TestHarness {
    harness_with(HarnessConfig::default())
}

pub fn harness_with(config: HarnessConfig) -> TestHarness {
    let (app, state) = build_app(config);
    let server = TestServer::builder()
        .http_transport()
        .build(app)
        .expect("test server");

    TestHarness { server, state }
}

/// Router wired the same way production wires it, dispatcher included.
fn build_app(limits: HarnessConfig) -> (Router, AppState) {
    let mut config = Config::default();
    config.limits.max_connections = limits.max_connections;
    config.limits.max_subscriptions_per_connection = limits.max_subscriptions_per_connection;
    config.websocket.send_buffer_size = limits.send_buffer_size;

    let registry = SubscriptionRegistry::new(config.limits);
    let (store, commits) = ReadModelStore::new(config.delivery.commit_buffer_size);
    let metrics = Metrics::new();
    let shutdown = ShutdownCoordinator::new();

    EventDispatcher::new(registry.clone(), metrics).spawn(commits, shutdown.subscribe_guard());

    let state = AppState {
        registry,
        store,
        metrics,
        shutdown,
        config: Arc::new(config),
    };

    let router = Router::new()
        .route("/ws", get(lq_ws::handler))
        .with_state(state.clone());

    (router, state)
}
