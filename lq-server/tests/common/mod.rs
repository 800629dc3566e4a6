#![allow(dead_code)]

//! Test infrastructure for lq-server endpoint tests

use lq_config::Config;
use lq_store::ReadModelStore;
use lq_ws::{AppState, EventDispatcher, Metrics, ShutdownCoordinator, SubscriptionRegistry};

use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusRecorder};

/// Create AppState for testing, with the event dispatcher running
pub fn create_test_app_state() -> AppState {
    let config = Config::default();

    let registry = SubscriptionRegistry::new(config.limits);
    let (store, commits) = ReadModelStore::new(config.delivery.commit_buffer_size);
    let metrics = Metrics::new();
    let shutdown = ShutdownCoordinator::new();

    EventDispatcher::new(registry.clone(), metrics).spawn(commits, shutdown.subscribe_guard());

    AppState {
        registry,
        store,
        metrics,
        shutdown,
        config: Arc::new(config),
    }
}

/// Build a recorder whose handle renders without installing globally,
/// so tests stay independent of each other
pub fn create_test_recorder() -> PrometheusRecorder {
    PrometheusBuilder::new().build_recorder()
}
