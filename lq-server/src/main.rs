pub mod admin;
pub mod error;
pub mod health;
pub mod logger;
pub mod routes;

pub use admin::StatsResponse;
pub use error::{Result as ServerErrorResult, ServerError};

pub use crate::routes::build_router;

use lq_store::ReadModelStore;
use lq_ws::{AppState, EventDispatcher, Metrics, ShutdownCoordinator, SubscriptionRegistry};

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use log::{error, info};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // .env overrides for development; ignored when absent
    let _ = dotenvy::dotenv();

    let config = lq_config::Config::load()?;
    config.validate()?;

    let log_file_path: Option<PathBuf> = config.logging.file.as_ref().map(PathBuf::from);
    if let Some(ref log_path) = log_file_path
        && let Some(parent) = log_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    // Logger first so everything below is visible
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("lq-server v{} starting", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // The recorder must be installed before the first counter fires
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ServerError::Metrics {
            message: e.to_string(),
        })?;

    let registry = SubscriptionRegistry::new(config.limits);
    let (store, commits) = ReadModelStore::new(config.delivery.commit_buffer_size);
    let metrics = Metrics::new();
    let shutdown = ShutdownCoordinator::new();

    // Fan-out task: consumes committed changes for the life of the process
    EventDispatcher::new(registry.clone(), metrics).spawn(commits, shutdown.subscribe_guard());
    info!("Event dispatcher spawned");

    let app_state = AppState {
        registry,
        store,
        metrics,
        shutdown: shutdown.clone(),
        config: Arc::new(config.clone()),
    };

    let app = build_router(app_state, metrics_handle);

    let listener = TcpListener::bind(&config.bind_addr()).await?;

    // local_addr resolves port 0 to the port the OS actually picked
    let actual_addr = listener.local_addr()?;
    info!("Listening on {}", actual_addr);

    spawn_signal_handler(shutdown.clone());

    info!("Accepting connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            info!("Shutdown signal honored, draining connections");
        })
        .await?;

    Ok(())
}

/// SIGINT trips the coordinator; connections then close themselves.
fn spawn_signal_handler(shutdown: ShutdownCoordinator) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("SIGINT received, shutting down");
                shutdown.shutdown();
            }
            Err(e) => {
                error!("SIGINT handler failed: {}", e);
            }
        }
    });
}
