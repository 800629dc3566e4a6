use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid filter: {message} {location}")]
    InvalidFilter {
        message: String,
        location: ErrorLocation,
    },

    #[error("Invalid selector: {message} {location}")]
    InvalidSelector {
        message: String,
        location: ErrorLocation,
    },

    #[error("Read model decode failed: {source} {location}")]
    Decode {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },
}

impl CoreError {
    #[track_caller]
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_selector(message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        Self::Decode {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
