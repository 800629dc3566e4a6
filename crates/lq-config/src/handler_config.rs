use crate::{ConfigErrorResult, check_range};

use serde::Deserialize;

pub const MIN_TIMEOUT_SECS: u64 = 1;
pub const MAX_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-message handler budget.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Seconds a single subscribe/mutation handler may run before the
    /// connection gives up on it
    pub timeout_secs: u64,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HandlerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        check_range(
            "handler.timeout_secs",
            self.timeout_secs,
            MIN_TIMEOUT_SECS,
            MAX_TIMEOUT_SECS,
        )
    }
}
