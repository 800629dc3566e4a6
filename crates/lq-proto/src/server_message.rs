use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::error_payload::{ErrorCode, ErrorPayload};

/// Why the server completed a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompleteReason {
    Unsubscribe,
    ConnectionClosed,
    Shutdown,
}

impl fmt::Display for CompleteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Unsubscribe => "unsubscribe",
            Self::ConnectionClosed => "connection_closed",
            Self::Shutdown => "shutdown",
        };
        write!(f, "{reason}")
    }
}

/// Frames the server sends over the realtime socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Subscription accepted. Reports the registry-created opaque id and
    /// marks the operation live: data can follow from here on, never before.
    SubscribeAck { id: String, subscription_id: String },
    /// One delivered change event. `payload` is the full post-mutation
    /// entity state.
    Data { id: String, payload: Value },
    /// Subscription ended server-side. Terminal for the operation key.
    Complete { id: String, reason: CompleteReason },
    MutationResult { id: String, payload: Value },
    /// Operation-scoped when `id` is set, connection-scoped otherwise.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        error: ErrorPayload,
    },
    Pong,
}

impl ServerMessage {
    pub fn decode(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn error(id: Option<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            id,
            error: ErrorPayload::new(code, message),
        }
    }

    /// Frame type tag for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SubscribeAck { .. } => "subscribe_ack",
            Self::Data { .. } => "data",
            Self::Complete { .. } => "complete",
            Self::MutationResult { .. } => "mutation_result",
            Self::Error { .. } => "error",
            Self::Pong => "pong",
        }
    }
}
