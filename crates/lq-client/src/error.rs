use std::panic::Location;

use error_location::ErrorLocation;
use lq_proto::ErrorCode;
use thiserror::Error;

/// Errors surfaced by the subscription client.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("not connected {location}")]
    NotConnected { location: ErrorLocation },

    #[error("connection failed: {message} {location}")]
    ConnectionFailed {
        message: String,
        location: ErrorLocation,
    },

    #[error("connection lost {location}")]
    ConnectionLost { location: ErrorLocation },

    #[error("transport error: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    /// The server answered with a frame the operation cannot accept.
    #[error("protocol violation: {message} {location}")]
    Protocol {
        message: String,
        location: ErrorLocation,
    },

    /// An `error` frame correlated to a request this client sent.
    #[error("server rejected operation ({code:?}): {message} {location}")]
    Server {
        code: ErrorCode,
        message: String,
        location: ErrorLocation,
    },

    /// An `error` frame addressed to an active subscription. Delivered on
    /// the owning handle's stream, never swallowed.
    #[error("subscription delivery error ({code:?}): {message} {location}")]
    Delivery {
        code: ErrorCode,
        message: String,
        location: ErrorLocation,
    },

    #[error("operation '{operation}' timed out {location}")]
    Timeout {
        operation: String,
        location: ErrorLocation,
    },
}

impl ClientError {
    #[track_caller]
    pub fn not_connected() -> Self {
        Self::NotConnected {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn connection_lost() -> Self {
        Self::ConnectionLost {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn server(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn delivery(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Delivery {
            code,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Whether another connection attempt is worth making.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. }
                | Self::ConnectionLost { .. }
                | Self::Transport { .. }
                | Self::Timeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
