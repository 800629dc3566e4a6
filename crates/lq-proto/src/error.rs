use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtoError>;

#[derive(Error, Debug)]
pub enum ProtoError {
    #[error("Message codec failed: {source} {location}")]
    Codec {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Invalid selector: {message} {location}")]
    InvalidSelector {
        message: String,
        location: ErrorLocation,
    },

    #[error(transparent)]
    Core(#[from] lq_core::CoreError),
}

impl ProtoError {
    #[track_caller]
    pub fn invalid_selector(message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for ProtoError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Codec {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
