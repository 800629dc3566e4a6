use crate::{ConnectionId, Result as WsErrorResult, Subscription, SubscriptionId, SubscriptionState, WsError};

use lq_core::{ReadModelChange, ReadModelSelector};
use lq_proto::ServerMessage;

use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use error_location::ErrorLocation;
use log::{debug, info, warn};
use lq_config::LimitsConfig;
use tokio::sync::{RwLock, mpsc};

/// One delivery target for a committed change: the operation key the data
/// frame quotes and the outbound channel of the owning connection.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub connection_id: ConnectionId,
    pub subscription_id: SubscriptionId,
    pub operation_id: String,
    pub sender: mpsc::Sender<ServerMessage>,
}

/// Registry for active connections and the subscriptions opened on them.
///
/// Connections own their subscriptions: removing a connection terminates
/// every subscription registered on it. All operations on one connection go
/// through the same write lock, so they apply in a single total order.
pub struct SubscriptionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    limits: LimitsConfig,
}

struct RegistryInner {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    subscription_total: usize,
}

struct ConnectionEntry {
    sender: mpsc::Sender<ServerMessage>,
    opened_at: DateTime<Utc>,
    /// Subscriptions keyed by the client-chosen operation id.
    subscriptions: HashMap<String, Subscription>,
}

impl SubscriptionRegistry {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner {
                connections: HashMap::new(),
                subscription_total: 0,
            })),
            limits,
        }
    }

    /// Register a new connection, returns its ConnectionId if capacity
    /// allows.
    pub async fn register(
        &self,
        sender: mpsc::Sender<ServerMessage>,
    ) -> WsErrorResult<ConnectionId> {
        let mut inner = self.inner.write().await;

        if inner.connections.len() >= self.limits.max_connections {
            warn!(
                "Connection limit reached: {}/{}",
                inner.connections.len(),
                self.limits.max_connections
            );
            return Err(WsError::ConnectionLimitExceeded {
                current: inner.connections.len(),
                max: self.limits.max_connections,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let connection_id = ConnectionId::new();
        inner.connections.insert(
            connection_id,
            ConnectionEntry {
                sender,
                opened_at: Utc::now(),
                subscriptions: HashMap::new(),
            },
        );
        info!(
            "Registered connection {connection_id} ({} total)",
            inner.connections.len()
        );

        Ok(connection_id)
    }

    /// Unregister a connection and terminate every subscription on it.
    /// Idempotent: unknown ids are a no-op. Returns the number of
    /// subscriptions that were terminated by the cascade.
    pub async fn unregister(&self, connection_id: ConnectionId) -> usize {
        let mut inner = self.inner.write().await;

        let Some(entry) = inner.connections.remove(&connection_id) else {
            return 0;
        };

        let terminated = entry.subscriptions.len();
        inner.subscription_total -= terminated;
        info!(
            "Unregistered connection {connection_id}: terminated {terminated} subscription(s) ({} connections remaining)",
            inner.connections.len()
        );

        terminated
    }

    /// Accept a subscription on a connection. The entry starts Pending and
    /// receives no deliveries until [`activate`](Self::activate) flips it.
    ///
    /// The selector is normalized to its filter form here, so by-id and
    /// filter subscriptions take the same delivery path.
    pub async fn accept(
        &self,
        connection_id: ConnectionId,
        key: &str,
        read_model: &str,
        selector: &ReadModelSelector,
    ) -> WsErrorResult<SubscriptionId> {
        let mut inner = self.inner.write().await;

        let max = self.limits.max_subscriptions_per_connection;
        let entry = inner.connections.get_mut(&connection_id).ok_or_else(|| {
            WsError::UnknownConnection {
                connection_id: connection_id.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        if entry.subscriptions.len() >= max {
            warn!(
                "Subscription limit reached on connection {connection_id}: {}/{max}",
                entry.subscriptions.len()
            );
            return Err(WsError::SubscriptionLimitExceeded {
                current: entry.subscriptions.len(),
                max,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if entry.subscriptions.contains_key(key) {
            return Err(WsError::DuplicateOperation {
                key: key.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let subscription = Subscription::new(read_model, selector.to_filter());
        let subscription_id = subscription.id;
        entry.subscriptions.insert(key.to_string(), subscription);
        inner.subscription_total += 1;

        debug!("Accepted subscription {subscription_id} ({read_model}) as {key} on {connection_id}");

        Ok(subscription_id)
    }

    /// Flip a pending subscription to Active. Deliveries start from here.
    /// Returns false when the connection or subscription is already gone,
    /// which can happen when the client disconnects mid-subscribe.
    pub async fn activate(&self, connection_id: ConnectionId, key: &str) -> bool {
        let mut inner = self.inner.write().await;

        let Some(subscription) = inner
            .connections
            .get_mut(&connection_id)
            .and_then(|entry| entry.subscriptions.get_mut(key))
        else {
            return false;
        };

        subscription.state = SubscriptionState::Active;
        true
    }

    /// Remove one subscription. Idempotent: returns whether an entry was
    /// actually removed.
    pub async fn remove(&self, connection_id: ConnectionId, key: &str) -> bool {
        let mut inner = self.inner.write().await;

        let removed = inner
            .connections
            .get_mut(&connection_id)
            .and_then(|entry| entry.subscriptions.remove(key));

        match removed {
            Some(subscription) => {
                inner.subscription_total -= 1;
                debug!(
                    "Removed subscription {} ({key}) from {connection_id}",
                    subscription.id
                );
                true
            }
            None => false,
        }
    }

    /// Snapshot the delivery targets for one committed change: every Active
    /// subscription whose read model and filter match its post-mutation
    /// state.
    pub async fn deliveries_for(&self, change: &ReadModelChange) -> Vec<Delivery> {
        let inner = self.inner.read().await;

        let mut deliveries = Vec::new();
        for (connection_id, entry) in &inner.connections {
            for (key, subscription) in &entry.subscriptions {
                if subscription.matches(change) {
                    deliveries.push(Delivery {
                        connection_id: *connection_id,
                        subscription_id: subscription.id,
                        operation_id: key.clone(),
                        sender: entry.sender.clone(),
                    });
                }
            }
        }
        deliveries
    }

    /// Total open connections.
    pub async fn connection_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.connections.len()
    }

    /// Total live subscriptions across all connections.
    pub async fn subscription_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner.subscription_total
    }

    /// Operation keys of the subscriptions live on one connection. Used to
    /// address complete frames when the connection winds down gracefully.
    pub async fn operation_keys(&self, connection_id: ConnectionId) -> Vec<String> {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&connection_id)
            .map(|entry| entry.subscriptions.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Live subscriptions on one connection. Zero for unknown connections.
    pub async fn subscription_count_for(&self, connection_id: ConnectionId) -> usize {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&connection_id)
            .map(|entry| entry.subscriptions.len())
            .unwrap_or(0)
    }

    /// How long a connection has been open. None for unknown connections.
    pub async fn open_since(&self, connection_id: ConnectionId) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().await;
        inner
            .connections
            .get(&connection_id)
            .map(|entry| entry.opened_at)
    }
}

impl Clone for SubscriptionRegistry {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            limits: self.limits,
        }
    }
}
