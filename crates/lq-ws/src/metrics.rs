use std::time::Instant;

use metrics::{counter, gauge, histogram};

// Dotted names; the Prometheus recorder sanitizes them to underscores.
const CONNECTIONS_ESTABLISHED: &str = "lq_ws.connections.established";
const CONNECTIONS_CLOSED: &str = "lq_ws.connections.closed";
const CONNECTIONS_ACTIVE: &str = "lq_ws.connections.active";
const MESSAGES_RECEIVED: &str = "lq_ws.messages.received";
const MESSAGES_SENT: &str = "lq_ws.messages.sent";
const MESSAGE_LATENCY_MS: &str = "lq_ws.messages.latency_ms";
const SUBSCRIPTIONS_OPENED: &str = "lq_ws.subscriptions.opened";
const SUBSCRIPTIONS_CLOSED: &str = "lq_ws.subscriptions.closed";
const SUBSCRIPTIONS_ACTIVE: &str = "lq_ws.subscriptions.active";
const DELIVERIES_SENT: &str = "lq_ws.deliveries.sent";
const DELIVERIES_DROPPED: &str = "lq_ws.deliveries.dropped";
const ERRORS_TOTAL: &str = "lq_ws.errors.total";

/// Front door to the `metrics` macros. Keeps the name set in one place
/// and lets call sites stay one-liners.
#[derive(Clone, Copy, Default)]
pub struct Metrics;

impl Metrics {
    pub fn new() -> Self {
        Self
    }

    pub fn connection_established(&self) {
        counter!(CONNECTIONS_ESTABLISHED).increment(1);
        gauge!(CONNECTIONS_ACTIVE).increment(1.0);
    }

    pub fn connection_closed(&self, reason: &'static str) {
        counter!(CONNECTIONS_CLOSED, "reason" => reason).increment(1);
        gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
    }

    pub fn message_received(&self, message_type: &'static str) {
        counter!(MESSAGES_RECEIVED, "type" => message_type).increment(1);
    }

    pub fn message_sent(&self, message_type: &'static str) {
        counter!(MESSAGES_SENT, "type" => message_type).increment(1);
    }

    pub fn subscription_opened(&self) {
        counter!(SUBSCRIPTIONS_OPENED).increment(1);
        gauge!(SUBSCRIPTIONS_ACTIVE).increment(1.0);
    }

    /// Subscriptions closed by unsubscribe or by a disconnect cascade.
    pub fn subscriptions_closed(&self, count: usize, reason: &'static str) {
        if count == 0 {
            return;
        }
        counter!(SUBSCRIPTIONS_CLOSED, "reason" => reason).increment(count as u64);
        gauge!(SUBSCRIPTIONS_ACTIVE).decrement(count as f64);
    }

    /// One change fanned out to one subscription.
    pub fn delivery_sent(&self) {
        counter!(DELIVERIES_SENT).increment(1);
    }

    /// A delivery dropped because the client's send buffer was full.
    pub fn delivery_dropped(&self) {
        counter!(DELIVERIES_DROPPED).increment(1);
    }

    pub fn error_occurred(&self, error_type: &'static str) {
        counter!(ERRORS_TOTAL, "type" => error_type).increment(1);
    }

    /// Start timing one inbound message.
    pub fn latency_timer(&self) -> LatencyTimer {
        LatencyTimer {
            start: Instant::now(),
        }
    }
}

/// Running timer from [`Metrics::latency_timer`]. Dropping it without
/// calling [`LatencyTimer::finish`] records nothing.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn finish(self) {
        histogram!(MESSAGE_LATENCY_MS).record(self.start.elapsed().as_millis() as f64);
    }
}
