use crate::{Metrics, ShutdownGuard, SubscriptionRegistry};

use lq_core::ReadModelChange;
use lq_proto::ServerMessage;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fans committed changes out to matching subscriptions.
///
/// A single task consumes the store's commit channel, so frames for any one
/// subscription leave in commit order. Every matching change produces its
/// own data frame; nothing is coalesced. A full per-connection send buffer
/// drops that connection's frame and counts it, other connections are
/// unaffected.
pub struct EventDispatcher {
    registry: SubscriptionRegistry,
    metrics: Metrics,
}

impl EventDispatcher {
    pub fn new(registry: SubscriptionRegistry, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    /// Spawn the fan-out task. Runs until the commit channel closes or
    /// shutdown is signalled.
    pub fn spawn(
        self,
        mut commits: mpsc::Receiver<ReadModelChange>,
        mut shutdown_guard: ShutdownGuard,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Event dispatcher started");

            loop {
                tokio::select! {
                    change = commits.recv() => {
                        match change {
                            Some(change) => self.dispatch(change).await,
                            None => {
                                info!("Commit channel closed, stopping event dispatcher");
                                break;
                            }
                        }
                    }
                    _ = shutdown_guard.wait() => {
                        info!("Shutting down event dispatcher");
                        break;
                    }
                }
            }
        })
    }

    async fn dispatch(&self, change: ReadModelChange) {
        let deliveries = self.registry.deliveries_for(&change).await;
        if deliveries.is_empty() {
            debug!(
                "No subscribers for {}/{} at sequence {}",
                change.read_model, change.id, change.sequence
            );
            return;
        }

        for delivery in deliveries {
            let frame = ServerMessage::Data {
                id: delivery.operation_id.clone(),
                payload: change.entity.clone(),
            };

            match delivery.sender.try_send(frame) {
                Ok(()) => self.metrics.delivery_sent(),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        "Dropped delivery for subscription {} on {}: send buffer full",
                        delivery.subscription_id, delivery.connection_id
                    );
                    self.metrics.delivery_dropped();
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Connection is tearing down; unregister will reap it.
                    debug!(
                        "Skipped delivery for subscription {}: connection {} closed",
                        delivery.subscription_id, delivery.connection_id
                    );
                }
            }
        }
    }
}
