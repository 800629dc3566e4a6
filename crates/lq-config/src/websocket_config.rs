use crate::{ConfigError, ConfigErrorResult, check_range};

use serde::Deserialize;

pub const MIN_SEND_BUFFER_SIZE: usize = 1;
pub const MAX_SEND_BUFFER_SIZE: usize = 8192;
pub const DEFAULT_SEND_BUFFER_SIZE: usize = 128;

pub const MIN_HEARTBEAT_INTERVAL_SECS: u64 = 1;
pub const MAX_HEARTBEAT_INTERVAL_SECS: u64 = 900;
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

pub const MIN_HEARTBEAT_TIMEOUT_SECS: u64 = 5;
pub const MAX_HEARTBEAT_TIMEOUT_SECS: u64 = 3600;
pub const DEFAULT_HEARTBEAT_TIMEOUT_SECS: u64 = 60;

/// Keepalive and per-socket buffering knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Outbound channel capacity per connection
    pub send_buffer_size: usize,
    /// Liveness check interval in seconds
    pub heartbeat_interval_secs: u64,
    /// Idle time in seconds after which a silent connection is closed
    pub heartbeat_timeout_secs: u64,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: DEFAULT_SEND_BUFFER_SIZE,
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            heartbeat_timeout_secs: DEFAULT_HEARTBEAT_TIMEOUT_SECS,
        }
    }
}

impl WebSocketConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        check_range(
            "websocket.send_buffer_size",
            self.send_buffer_size,
            MIN_SEND_BUFFER_SIZE,
            MAX_SEND_BUFFER_SIZE,
        )?;
        check_range(
            "websocket.heartbeat_interval_secs",
            self.heartbeat_interval_secs,
            MIN_HEARTBEAT_INTERVAL_SECS,
            MAX_HEARTBEAT_INTERVAL_SECS,
        )?;
        check_range(
            "websocket.heartbeat_timeout_secs",
            self.heartbeat_timeout_secs,
            MIN_HEARTBEAT_TIMEOUT_SECS,
            MAX_HEARTBEAT_TIMEOUT_SECS,
        )?;

        // A timeout at or below the interval would kill every connection
        // on its first quiet period.
        if self.heartbeat_timeout_secs <= self.heartbeat_interval_secs {
            return Err(ConfigError::invalid(format!(
                "websocket.heartbeat_timeout_secs must exceed heartbeat_interval_secs, got {} <= {}",
                self.heartbeat_timeout_secs, self.heartbeat_interval_secs
            )));
        }

        Ok(())
    }
}
