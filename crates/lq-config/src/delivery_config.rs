use crate::{ConfigErrorResult, check_range};

use serde::Deserialize;

pub const MIN_COMMIT_BUFFER_SIZE: usize = 1;
pub const MAX_COMMIT_BUFFER_SIZE: usize = 100000;
pub const DEFAULT_COMMIT_BUFFER_SIZE: usize = 1024;

/// Change delivery pipeline settings.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Capacity of the committed-change channel between store and dispatcher.
    /// Mutations block (apply backpressure) when the dispatcher falls this
    /// far behind.
    pub commit_buffer_size: usize,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            commit_buffer_size: DEFAULT_COMMIT_BUFFER_SIZE,
        }
    }
}

impl DeliveryConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        check_range(
            "delivery.commit_buffer_size",
            self.commit_buffer_size,
            MIN_COMMIT_BUFFER_SIZE,
            MAX_COMMIT_BUFFER_SIZE,
        )
    }
}
