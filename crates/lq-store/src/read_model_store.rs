use std::collections::HashMap;
use std::sync::Arc;

use lq_core::{CART_READ_MODEL, CartReadModel, ReadModelChange};
use serde_json::Value;
use tokio::sync::{RwLock, mpsc};

use crate::error::{Result, StoreError};

/// In-memory read-model projection store.
///
/// Commits are totally ordered. The sequence number is assigned and the
/// change is handed to the commit channel under the same write lock, so the
/// dispatcher observes changes in exactly commit order. Mutations block when
/// the channel is full; the pipeline applies backpressure instead of
/// reordering or dropping commits.
pub struct ReadModelStore {
    inner: Arc<RwLock<StoreInner>>,
    commits: mpsc::Sender<ReadModelChange>,
}

struct StoreInner {
    /// read-model type -> entity id -> current state
    entities: HashMap<String, HashMap<String, Value>>,
    sequence: u64,
}

impl Clone for ReadModelStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            commits: self.commits.clone(),
        }
    }
}

impl ReadModelStore {
    /// Create the store and the receiving end of its commit channel.
    /// The receiver belongs to the event dispatcher.
    pub fn new(commit_buffer_size: usize) -> (Self, mpsc::Receiver<ReadModelChange>) {
        let (commits, receiver) = mpsc::channel(commit_buffer_size);
        let store = Self {
            inner: Arc::new(RwLock::new(StoreInner {
                entities: HashMap::new(),
                sequence: 0,
            })),
            commits,
        };
        (store, receiver)
    }

    /// Current state of one entity.
    pub async fn get(&self, read_model: &str, id: &str) -> Option<Value> {
        let inner = self.inner.read().await;
        inner.entities.get(read_model)?.get(id).cloned()
    }

    /// Number of entities of a read-model type.
    pub async fn entity_count(&self, read_model: &str) -> usize {
        let inner = self.inner.read().await;
        inner.entities.get(read_model).map_or(0, HashMap::len)
    }

    /// Highest committed sequence number.
    pub async fn last_sequence(&self) -> u64 {
        self.inner.read().await.sequence
    }

    /// Commit a full entity state under one write lock.
    pub async fn commit(&self, read_model: &str, id: &str, entity: Value) -> Result<u64> {
        let mut inner = self.inner.write().await;
        self.commit_locked(&mut inner, read_model, id, entity).await
    }

    /// The `ChangeCartItem` mutation: load or create the cart, apply the
    /// item change, commit the new state. Returns the mutation result
    /// reported to the client.
    pub async fn change_cart_item(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> Result<bool> {
        let mut inner = self.inner.write().await;

        let mut cart = match inner
            .entities
            .get(CART_READ_MODEL)
            .and_then(|carts| carts.get(cart_id))
        {
            Some(entity) => CartReadModel::from_entity(entity)?,
            None => CartReadModel::new(cart_id),
        };
        cart.apply_change_item(product_id, quantity);
        let entity = cart.to_entity()?;

        self.commit_locked(&mut inner, CART_READ_MODEL, cart_id, entity)
            .await?;
        Ok(true)
    }

    // Sequence assignment and channel emission stay under the caller's
    // write guard: emission order is commit order.
    async fn commit_locked(
        &self,
        inner: &mut StoreInner,
        read_model: &str,
        id: &str,
        entity: Value,
    ) -> Result<u64> {
        inner.sequence += 1;
        let sequence = inner.sequence;
        let change = ReadModelChange::new(read_model, id, entity.clone(), sequence);
        inner
            .entities
            .entry(read_model.to_string())
            .or_default()
            .insert(id.to_string(), entity);

        self.commits
            .send(change)
            .await
            .map_err(|_| StoreError::pipeline_closed())?;
        log::debug!("committed {read_model}/{id} at sequence {sequence}");
        Ok(sequence)
    }
}
