use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The commit channel receiver is gone: the delivery pipeline has shut
    /// down. Mutations cannot commit without a live pipeline.
    #[error("Commit pipeline closed {location}")]
    PipelineClosed { location: ErrorLocation },

    #[error(transparent)]
    Core(#[from] lq_core::CoreError),
}

impl StoreError {
    #[track_caller]
    pub(crate) fn pipeline_closed() -> Self {
        Self::PipelineClosed {
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
