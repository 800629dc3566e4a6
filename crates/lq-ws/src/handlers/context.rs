use crate::{ConnectionId, Metrics, SubscriptionRegistry};

use lq_proto::ServerMessage;
use lq_store::ReadModelStore;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use lq_config::{HandlerConfig, ValidationConfig};
use tokio::sync::mpsc;
use uuid::Uuid;

static REQUEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Everything a handler needs: the connection's identity and outbound
/// channel, the shared registry and store, limits, and a trace for logs.
#[derive(Clone)]
pub struct HandlerContext {
    /// Connection the frame arrived on
    pub connection_id: ConnectionId,
    /// Registry holding this connection's subscriptions
    pub registry: SubscriptionRegistry,
    /// Read-model store mutations run against
    pub store: ReadModelStore,
    /// Outbound channel of the owning connection
    pub outbound: mpsc::Sender<ServerMessage>,
    /// Metrics collector
    pub metrics: Metrics,
    /// Validation limits for client-supplied fields
    pub validation: ValidationConfig,
    /// Handler execution limits
    pub handler: HandlerConfig,
    /// Correlation and timing for this one frame
    pub trace: RequestTrace,
}

impl HandlerContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        connection_id: ConnectionId,
        registry: SubscriptionRegistry,
        store: ReadModelStore,
        outbound: mpsc::Sender<ServerMessage>,
        metrics: Metrics,
        validation: ValidationConfig,
        handler: HandlerConfig,
        operation_id: Option<&str>,
    ) -> Self {
        let trace = RequestTrace::new(connection_id.to_string(), operation_id);

        Self {
            connection_id,
            registry,
            store,
            outbound,
            metrics,
            validation,
            handler,
            trace,
        }
    }

    pub fn log_prefix(&self) -> String {
        self.trace.log_prefix()
    }
}

impl std::fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerContext")
            .field("connection_id", &self.connection_id)
            .field("correlation_id", &self.trace.correlation_id)
            .finish()
    }
}

/// Correlation id plus timing for one inbound frame.
#[derive(Debug, Clone)]
pub struct RequestTrace {
    /// Client operation key when the frame carried one, generated otherwise
    pub correlation_id: String,
    /// Monotonic per-process frame counter
    pub request_seq: u64,
    /// Connection the frame arrived on
    pub connection_id: String,
    started_at: Instant,
}

impl RequestTrace {
    pub fn new(connection_id: String, operation_id: Option<&str>) -> Self {
        let request_seq = REQUEST_COUNTER.fetch_add(1, Ordering::SeqCst);

        let correlation_id = match operation_id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("req-{}-{}", request_seq, Uuid::new_v4().as_simple()),
        };

        Self {
            correlation_id,
            request_seq,
            connection_id,
            started_at: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }

    pub fn log_prefix(&self) -> String {
        format!(
            "[req={} conn={}]",
            head(&self.correlation_id),
            head(&self.connection_id)
        )
    }
}

/// First eight characters of an id. Correlation ids can be client-chosen,
/// so this must not split a multi-byte character.
fn head(s: &str) -> &str {
    let end = (0..=s.len().min(8))
        .rev()
        .find(|i| s.is_char_boundary(*i))
        .unwrap_or(0);
    &s[..end]
}
