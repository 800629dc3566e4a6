use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lq_core::ReadModelSelector;
use lq_proto::{ClientMessage, SelectorInput, ServerMessage};
use serde_json::Value;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::time::{sleep, timeout};

use crate::backoff::{Backoff, ReconnectConfig};
use crate::desired::DesiredSubscriptions;
use crate::error::{ClientError, Result};
use crate::transport::{SubscriptionTransport, TransportReceiver, TransportSender, TransportSession};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client-side knobs. Not file-loaded; embedding applications construct it.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long a request waits for its correlated reply
    pub request_timeout: Duration,
    pub reconnect: ReconnectConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// A live subscription as seen by the caller.
///
/// The handle outlives sessions: after a reconnect the same handle keeps
/// delivering, fed by the re-established server-side subscription.
pub struct SubscriptionHandle {
    key: String,
    subscription_id: String,
    updates: mpsc::UnboundedReceiver<Result<Value>>,
}

impl SubscriptionHandle {
    /// The operation key correlating every frame of this subscription.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The server-assigned id from the ack that opened this handle. A
    /// reconnect assigns a fresh one, visible via
    /// [`LiveClient::subscription_id`].
    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    /// Next delivered state, or a delivery error the server reported for
    /// this subscription. `None` once the subscription is unsubscribed.
    pub async fn next(&mut self) -> Option<Result<Value>> {
        self.updates.recv().await
    }
}

impl std::fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("key", &self.key)
            .field("subscription_id", &self.subscription_id)
            .finish()
    }
}

enum Reply {
    Ack { subscription_id: String },
    Mutation(Value),
    Completed,
}

struct Shared {
    /// Bumped on every session install and teardown; a router whose
    /// generation no longer matches must not touch state.
    generation: u64,
    desired: DesiredSubscriptions,
    handles: HashMap<String, mpsc::UnboundedSender<Result<Value>>>,
    subscription_ids: HashMap<String, String>,
    pending: HashMap<String, oneshot::Sender<Result<Reply>>>,
    pong_waiters: VecDeque<oneshot::Sender<()>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            generation: 0,
            desired: DesiredSubscriptions::new(),
            handles: HashMap::new(),
            subscription_ids: HashMap::new(),
            pending: HashMap::new(),
            pong_waiters: VecDeque::new(),
        }
    }

    /// Fail everything scoped to the dead session. Desired subscriptions and
    /// their handles survive for the next session.
    fn session_lost(&mut self) {
        for (_, waiter) in self.pending.drain() {
            let _ = waiter.send(Err(ClientError::connection_lost()));
        }
        self.pong_waiters.clear();
        self.subscription_ids.clear();
    }

    fn route(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::SubscribeAck {
                id,
                subscription_id,
            } => {
                self.subscription_ids
                    .insert(id.clone(), subscription_id.clone());
                if let Some(waiter) = self.pending.remove(&id) {
                    let _ = waiter.send(Ok(Reply::Ack { subscription_id }));
                }
            }
            ServerMessage::Data { id, payload } => match self.handles.get(&id) {
                Some(handle) => {
                    if handle.send(Ok(payload)).is_err() {
                        log::debug!("delivery for abandoned handle '{id}' dropped");
                    }
                }
                None => log::debug!("delivery for unknown key '{id}' dropped"),
            },
            ServerMessage::Complete { id, reason } => {
                if let Some(waiter) = self.pending.remove(&id) {
                    let _ = waiter.send(Ok(Reply::Completed));
                } else if self.desired.contains(&id) {
                    // Session-scoped termination. The key stays desired and
                    // is re-subscribed on the next reconnect.
                    self.subscription_ids.remove(&id);
                    log::debug!("subscription '{id}' completed server-side: {reason}");
                }
            }
            ServerMessage::MutationResult { id, payload } => {
                match self.pending.remove(&id) {
                    Some(waiter) => {
                        let _ = waiter.send(Ok(Reply::Mutation(payload)));
                    }
                    None => log::warn!("mutation result for unknown operation '{id}'"),
                }
            }
            ServerMessage::Error { id: Some(id), error } => {
                if let Some(waiter) = self.pending.remove(&id) {
                    let _ = waiter.send(Err(ClientError::server(error.code, error.message)));
                } else if let Some(handle) = self.handles.get(&id) {
                    let _ = handle.send(Err(ClientError::delivery(error.code, error.message)));
                } else {
                    log::warn!(
                        "error frame for unknown operation '{id}': {}",
                        error.message
                    );
                }
            }
            ServerMessage::Error { id: None, error } => {
                log::warn!("connection-scoped error: {}", error.message);
            }
            ServerMessage::Pong => {
                // Stale waiters from timed-out pings drop their receiver;
                // skip them so FIFO matching stays aligned.
                while let Some(waiter) = self.pong_waiters.pop_front() {
                    if waiter.send(()).is_ok() {
                        break;
                    }
                }
            }
        }
    }
}

/// The subscription client.
///
/// Holds a declarative desired-subscription set and reconciles it against
/// transport sessions: `subscribe`/`unsubscribe` edit the set and the wire
/// in one step, `reconnect` opens a fresh session and re-issues a subscribe
/// for every desired entry before returning.
pub struct LiveClient {
    transport: Arc<dyn SubscriptionTransport>,
    config: ClientConfig,
    sender: Mutex<Option<Box<dyn TransportSender>>>,
    shared: Arc<Mutex<Shared>>,
    operation_seq: AtomicU64,
}

impl LiveClient {
    pub fn new(transport: Arc<dyn SubscriptionTransport>) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: Arc<dyn SubscriptionTransport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            sender: Mutex::new(None),
            shared: Arc::new(Mutex::new(Shared::new())),
            operation_seq: AtomicU64::new(0),
        }
    }

    /// Open the initial session. No-op when a session is already installed;
    /// a dead session is replaced by [`LiveClient::reconnect`], not here.
    pub async fn connect(&self) -> Result<()> {
        let mut slot = self.sender.lock().await;
        if slot.is_some() {
            return Ok(());
        }
        let session = self.transport.connect().await?;
        self.install_session(&mut slot, session).await;
        Ok(())
    }

    /// Drop the session. Server-side cascade terminates the connection's
    /// subscriptions; the desired set is untouched. Idempotent.
    pub async fn disconnect(&self) -> Result<()> {
        let mut slot = self.sender.lock().await;
        let Some(mut sender) = slot.take() else {
            return Ok(());
        };
        if let Err(error) = sender.close().await {
            log::debug!("close failed: {error}");
        }
        let mut shared = self.shared.lock().await;
        shared.generation += 1; // orphan the session's router
        shared.session_lost();
        Ok(())
    }

    /// Replace the session and re-establish every desired subscription.
    ///
    /// Connection attempts back off per the reconnect config. Existing
    /// handles keep delivering once this returns: every mutation committed
    /// after the re-subscribe acks flows to them with no gap.
    pub async fn reconnect(&self) -> Result<()> {
        self.disconnect().await?;
        let session = self.connect_with_backoff().await?;
        {
            let mut slot = self.sender.lock().await;
            self.install_session(&mut slot, session).await;
        }
        self.resubscribe_desired().await
    }

    /// Open a subscription and return its delivery handle.
    pub async fn subscribe(
        &self,
        read_model: &str,
        selector: ReadModelSelector,
    ) -> Result<SubscriptionHandle> {
        let key = self.next_operation_id();
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let mut shared = self.shared.lock().await;
            shared
                .desired
                .insert(key.clone(), read_model, selector.clone());
            shared.handles.insert(key.clone(), updates_tx);
            shared.pending.insert(key.clone(), reply_tx);
        }

        let frame = ClientMessage::Subscribe {
            id: key.clone(),
            read_model: read_model.to_string(),
            selector: SelectorInput::from_selector(&selector),
        };
        if let Err(error) = self.send_frame(frame).await {
            self.abandon_subscribe(&key).await;
            return Err(error);
        }

        match self.await_reply(&key, reply_rx).await {
            Ok(Reply::Ack { subscription_id }) => Ok(SubscriptionHandle {
                key,
                subscription_id,
                updates: updates_rx,
            }),
            Ok(_) => {
                self.abandon_subscribe(&key).await;
                Err(ClientError::protocol("expected subscribe ack"))
            }
            Err(error) => {
                self.abandon_subscribe(&key).await;
                Err(error)
            }
        }
    }

    /// Close a subscription by handle. Idempotent.
    pub async fn unsubscribe(&self, handle: &SubscriptionHandle) -> Result<()> {
        self.unsubscribe_key(handle.key()).await
    }

    /// Close a subscription by operation key. Removes it from the desired
    /// set, ends the handle stream and awaits the server's completion.
    /// Unknown keys and repeated calls succeed without effect.
    pub async fn unsubscribe_key(&self, key: &str) -> Result<()> {
        let was_desired = {
            let mut shared = self.shared.lock().await;
            shared.handles.remove(key);
            shared.subscription_ids.remove(key);
            shared.desired.remove(key)
        };
        if !was_desired {
            return Ok(());
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.shared
            .lock()
            .await
            .pending
            .insert(key.to_string(), reply_tx);

        match self
            .send_frame(ClientMessage::Unsubscribe { id: key.to_string() })
            .await
        {
            Ok(()) => {}
            Err(ClientError::NotConnected { .. }) => {
                // No session means no server-side subscription to close.
                self.shared.lock().await.pending.remove(key);
                return Ok(());
            }
            Err(error) => {
                self.shared.lock().await.pending.remove(key);
                return Err(error);
            }
        }

        match self.await_reply(key, reply_rx).await? {
            Reply::Completed => Ok(()),
            _ => Err(ClientError::protocol("expected completion")),
        }
    }

    /// Run a named mutation and return its result payload.
    pub async fn mutate(&self, name: &str, input: Value) -> Result<Value> {
        let id = self.next_operation_id();
        let (reply_tx, reply_rx) = oneshot::channel();
        self.shared.lock().await.pending.insert(id.clone(), reply_tx);

        let frame = ClientMessage::Mutate {
            id: id.clone(),
            name: name.to_string(),
            input,
        };
        if let Err(error) = self.send_frame(frame).await {
            self.shared.lock().await.pending.remove(&id);
            return Err(error);
        }

        match self.await_reply(&id, reply_rx).await? {
            Reply::Mutation(payload) => Ok(payload),
            _ => Err(ClientError::protocol("expected mutation result")),
        }
    }

    /// Round-trip a protocol ping.
    pub async fn ping(&self) -> Result<()> {
        let (pong_tx, pong_rx) = oneshot::channel();
        self.shared.lock().await.pong_waiters.push_back(pong_tx);

        if let Err(error) = self.send_frame(ClientMessage::Ping).await {
            self.shared.lock().await.pong_waiters.pop_back();
            return Err(error);
        }

        match timeout(self.config.request_timeout, pong_rx).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(ClientError::connection_lost()),
            Err(_) => Err(ClientError::timeout("ping")),
        }
    }

    /// Whether a session is installed. Liveness is only discovered by using
    /// it; a session the server already dropped still counts until the next
    /// send or reconnect.
    pub async fn is_connected(&self) -> bool {
        self.sender.lock().await.is_some()
    }

    /// Latest server-assigned id for a desired subscription, when the
    /// current session has acked it.
    pub async fn subscription_id(&self, key: &str) -> Option<String> {
        self.shared.lock().await.subscription_ids.get(key).cloned()
    }

    pub async fn desired_count(&self) -> usize {
        self.shared.lock().await.desired.len()
    }

    pub async fn desired_keys(&self) -> Vec<String> {
        self.shared.lock().await.desired.keys()
    }

    fn next_operation_id(&self) -> String {
        let seq = self.operation_seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("op-{seq}")
    }

    async fn install_session(
        &self,
        slot: &mut Option<Box<dyn TransportSender>>,
        session: TransportSession,
    ) {
        let TransportSession { sender, receiver } = session;
        let generation = {
            let mut shared = self.shared.lock().await;
            shared.generation += 1;
            shared.generation
        };
        *slot = Some(sender);
        tokio::spawn(run_router(receiver, Arc::clone(&self.shared), generation));
    }

    async fn connect_with_backoff(&self) -> Result<TransportSession> {
        let mut backoff = Backoff::new(&self.config.reconnect);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.transport.connect().await {
                Ok(session) => {
                    if attempts > 1 {
                        log::info!("reconnected after {attempts} attempts");
                    }
                    return Ok(session);
                }
                Err(error) => {
                    if !error.is_retryable() || attempts >= self.config.reconnect.max_attempts {
                        log::warn!("reconnect failed after {attempts} attempts: {error}");
                        return Err(error);
                    }
                    let delay = backoff.next_delay();
                    log::debug!(
                        "connect attempt {attempts} failed: {error}. Retrying in {delay:?}"
                    );
                    sleep(delay).await;
                }
            }
        }
    }

    async fn resubscribe_desired(&self) -> Result<()> {
        let wanted = self.shared.lock().await.desired.snapshot();

        for (key, entry) in wanted {
            let (reply_tx, reply_rx) = oneshot::channel();
            self.shared
                .lock()
                .await
                .pending
                .insert(key.clone(), reply_tx);

            let frame = ClientMessage::Subscribe {
                id: key.clone(),
                read_model: entry.read_model.clone(),
                selector: SelectorInput::from_selector(&entry.selector),
            };
            if let Err(error) = self.send_frame(frame).await {
                self.shared.lock().await.pending.remove(&key);
                return Err(error);
            }

            match self.await_reply(&key, reply_rx).await? {
                Reply::Ack { .. } => {}
                _ => return Err(ClientError::protocol("expected subscribe ack")),
            }
        }
        Ok(())
    }

    async fn send_frame(&self, message: ClientMessage) -> Result<()> {
        let mut slot = self.sender.lock().await;
        match slot.as_mut() {
            Some(sender) => sender.send(message).await,
            None => Err(ClientError::not_connected()),
        }
    }

    async fn await_reply(
        &self,
        key: &str,
        reply: oneshot::Receiver<Result<Reply>>,
    ) -> Result<Reply> {
        match timeout(self.config.request_timeout, reply).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ClientError::connection_lost()),
            Err(_) => {
                self.shared.lock().await.pending.remove(key);
                Err(ClientError::timeout(key))
            }
        }
    }

    async fn abandon_subscribe(&self, key: &str) {
        let mut shared = self.shared.lock().await;
        shared.desired.remove(key);
        shared.handles.remove(key);
        shared.subscription_ids.remove(key);
        shared.pending.remove(key);
    }
}

impl std::fmt::Debug for LiveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn run_router(
    mut receiver: Box<dyn TransportReceiver>,
    shared: Arc<Mutex<Shared>>,
    generation: u64,
) {
    while let Some(frame) = receiver.receive().await {
        match frame {
            Ok(message) => {
                let mut shared = shared.lock().await;
                if shared.generation != generation {
                    // A newer session took over; this router is done.
                    return;
                }
                shared.route(message);
            }
            Err(error) => {
                log::warn!("transport receive failed: {error}");
                break;
            }
        }
    }

    let mut shared = shared.lock().await;
    if shared.generation == generation {
        shared.session_lost();
    }
}
