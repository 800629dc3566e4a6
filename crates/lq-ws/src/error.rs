use std::panic::Location;

use error_location::ErrorLocation;
use lq_proto::{ErrorCode, ErrorPayload, ProtoError};
use lq_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WsError {
    #[error("Connection closed ({reason}) {location}")]
    ConnectionClosed {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Connection limit reached: {current} of {max} open {location}")]
    ConnectionLimitExceeded {
        current: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Subscription limit reached: {current} of {max} on this connection {location}")]
    SubscriptionLimitExceeded {
        current: usize,
        max: usize,
        location: ErrorLocation,
    },

    #[error("Unknown connection: {connection_id} {location}")]
    UnknownConnection {
        connection_id: String,
        location: ErrorLocation,
    },

    #[error("Operation id already subscribed on this connection: {key} {location}")]
    DuplicateOperation {
        key: String,
        location: ErrorLocation,
    },

    #[error("Unknown read model: {name} {location}")]
    UnknownReadModel {
        name: String,
        location: ErrorLocation,
    },

    #[error("Unknown mutation: {name} {location}")]
    UnknownMutation {
        name: String,
        location: ErrorLocation,
    },

    #[error("Invalid frame: {message} {location}")]
    InvalidMessage {
        message: String,
        location: ErrorLocation,
    },

    #[error("Send buffer full, dropping slow client {location}")]
    SendBufferFull { location: ErrorLocation },

    #[error("Handler timed out after {timeout_secs}s {location}")]
    HandlerTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("No frames received for {timeout_secs}s, connection presumed dead {location}")]
    HeartbeatTimeout {
        timeout_secs: u64,
        location: ErrorLocation,
    },

    #[error("Internal error ({message}) {location}")]
    Internal {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Proto(#[from] ProtoError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WsError {
    #[track_caller]
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::InvalidMessage {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Wire error code reported to the client for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ConnectionClosed { .. } => ErrorCode::Internal,
            Self::ConnectionLimitExceeded { .. } => ErrorCode::Internal,
            Self::SubscriptionLimitExceeded { .. } => ErrorCode::SubscriptionLimit,
            Self::UnknownConnection { .. } => ErrorCode::Internal,
            Self::DuplicateOperation { .. } => ErrorCode::InvalidMessage,
            Self::UnknownReadModel { .. } => ErrorCode::UnknownReadModel,
            Self::UnknownMutation { .. } => ErrorCode::UnknownMutation,
            Self::InvalidMessage { .. } => ErrorCode::InvalidMessage,
            Self::SendBufferFull { .. } => ErrorCode::DeliveryError,
            Self::HandlerTimeout { .. } => ErrorCode::Internal,
            Self::HeartbeatTimeout { .. } => ErrorCode::Internal,
            Self::Internal { .. } => ErrorCode::Internal,
            Self::Proto(ProtoError::Codec { .. }) => ErrorCode::DecodeError,
            Self::Proto(_) => ErrorCode::InvalidMessage,
            Self::Store(_) => ErrorCode::Internal,
        }
    }

    /// Convert to a wire error payload. The message is truncated so a
    /// pathological input cannot echo itself back at full size.
    pub fn to_error_payload(&self, max_message_length: usize) -> ErrorPayload {
        let mut message = self.to_string();
        if message.len() > max_message_length {
            message.truncate(
                (0..=max_message_length)
                    .rev()
                    .find(|i| message.is_char_boundary(*i))
                    .unwrap_or(0),
            );
        }
        ErrorPayload::new(self.error_code(), message)
    }
}

pub type Result<T> = std::result::Result<T, WsError>;
