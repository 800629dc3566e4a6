use crate::{ConfigErrorResult, check_range};

use serde::Deserialize;

pub const MIN_MAX_CONNECTIONS: usize = 1;
pub const MAX_MAX_CONNECTIONS: usize = 100000;
pub const DEFAULT_MAX_CONNECTIONS: usize = 1000;

pub const MIN_MAX_SUBSCRIPTIONS: usize = 1;
pub const MAX_MAX_SUBSCRIPTIONS: usize = 10000;
pub const DEFAULT_MAX_SUBSCRIPTIONS: usize = 100;

/// Registry admission limits.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum open connections
    pub max_connections: usize,
    /// Maximum live subscriptions per connection
    pub max_subscriptions_per_connection: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_subscriptions_per_connection: DEFAULT_MAX_SUBSCRIPTIONS,
        }
    }
}

impl LimitsConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        check_range(
            "limits.max_connections",
            self.max_connections,
            MIN_MAX_CONNECTIONS,
            MAX_MAX_CONNECTIONS,
        )?;
        check_range(
            "limits.max_subscriptions_per_connection",
            self.max_subscriptions_per_connection,
            MIN_MAX_SUBSCRIPTIONS,
            MAX_MAX_SUBSCRIPTIONS,
        )
    }
}
