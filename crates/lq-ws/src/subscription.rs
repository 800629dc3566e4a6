use crate::SubscriptionId;

use lq_core::{Filter, ReadModelChange};

use chrono::{DateTime, Utc};

/// Lifecycle of a registry entry.
///
/// `Pending` sits between accept and the acknowledgment going out; only
/// `Active` entries receive deliveries. Termination removes the entry, so
/// there is no terminal variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Pending,
    Active,
}

/// One accepted subscription on a connection, keyed by the client-chosen
/// operation id.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub read_model: String,
    pub filter: Filter,
    pub state: SubscriptionState,
    pub accepted_at: DateTime<Utc>,
}

impl Subscription {
    pub fn new(read_model: impl Into<String>, filter: Filter) -> Self {
        Self {
            id: SubscriptionId::new(),
            read_model: read_model.into(),
            filter,
            state: SubscriptionState::Pending,
            accepted_at: Utc::now(),
        }
    }

    /// Whether a committed change should be delivered to this subscription.
    /// The filter runs against the post-mutation entity state.
    pub fn matches(&self, change: &ReadModelChange) -> bool {
        self.state == SubscriptionState::Active
            && self.read_model == change.read_model
            && self.filter.matches(&change.entity)
    }
}
