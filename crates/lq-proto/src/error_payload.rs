use serde::{Deserialize, Serialize};

/// Machine-readable error codes carried by wire `error` frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Frame was not valid JSON or not a known message shape.
    DecodeError,
    /// Frame decoded but failed validation.
    InvalidMessage,
    UnknownReadModel,
    UnknownMutation,
    /// Unsubscribe or data routing for a key this connection never opened.
    UnknownSubscription,
    SubscriptionLimit,
    /// A delivery for an active subscription failed server-side. Surfaced to
    /// the owning subscription, never swallowed.
    DeliveryError,
    Internal,
}

/// Error detail inside a wire `error` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}
