use chrono::{DateTime, Utc};
use serde_json::Value;

/// A committed update to one read-model entity.
///
/// Changes carry the full post-mutation entity state. Filters evaluate
/// against `entity`, never against a diff, so a subscription picks up an
/// entity as soon as any mutation makes it match.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadModelChange {
    /// Read-model type name, e.g. `CartReadModel`.
    pub read_model: String,
    /// Entity id within the read-model type.
    pub id: String,
    /// Full entity state after the mutation committed.
    pub entity: Value,
    /// Store-wide commit number. Strictly increasing; per-subscription
    /// delivery follows this order.
    pub sequence: u64,
    /// Commit wall-clock time.
    pub committed_at: DateTime<Utc>,
}

impl ReadModelChange {
    pub fn new(
        read_model: impl Into<String>,
        id: impl Into<String>,
        entity: Value,
        sequence: u64,
    ) -> Self {
        Self {
            read_model: read_model.into(),
            id: id.into(),
            entity,
            sequence,
            committed_at: Utc::now(),
        }
    }
}
