use std::collections::HashMap;

use lq_core::ReadModelSelector;

/// One wanted subscription, independent of any session.
#[derive(Debug, Clone, PartialEq)]
pub struct DesiredSubscription {
    pub read_model: String,
    pub selector: ReadModelSelector,
}

/// The set of subscriptions the client wants to exist, keyed by operation
/// key.
///
/// This is the reconciliation source of truth: sessions come and go, the
/// desired set persists, and reconnect re-issues a subscribe for every entry
/// rather than relying on per-disconnect bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct DesiredSubscriptions {
    entries: HashMap<String, DesiredSubscription>,
}

impl DesiredSubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a wanted subscription. A colliding key is replaced; the newer
    /// wish wins.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        read_model: impl Into<String>,
        selector: ReadModelSelector,
    ) -> Option<DesiredSubscription> {
        self.entries.insert(
            key.into(),
            DesiredSubscription {
                read_model: read_model.into(),
                selector,
            },
        )
    }

    /// Drop a wanted subscription. `false` when the key was not present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&DesiredSubscription> {
        self.entries.get(key)
    }

    /// Keys in sorted order, so reconciliation passes are deterministic.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Sorted snapshot for a reconciliation pass.
    pub fn snapshot(&self) -> Vec<(String, DesiredSubscription)> {
        let mut entries: Vec<(String, DesiredSubscription)> = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
