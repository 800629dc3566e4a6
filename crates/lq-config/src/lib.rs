mod config;
mod delivery_config;
mod error;
mod handler_config;
mod limits_config;
mod logging_config;
mod server_config;
mod validation_config;
mod websocket_config;

pub use config::Config;
pub use delivery_config::DeliveryConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use handler_config::HandlerConfig;
pub use limits_config::LimitsConfig;
pub use logging_config::{LogLevel, LoggingConfig};
pub use server_config::ServerConfig;
pub use validation_config::ValidationConfig;
pub use websocket_config::WebSocketConfig;

use std::fmt::Display;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const MIN_PORT: u16 = 1024;
pub const DEFAULT_LOG_LEVEL_STRING: &str = "info";
pub const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;

/// Bounds check shared by the per-section validators. `field` is the
/// dotted TOML path so the message points at the offending line.
#[track_caller]
pub(crate) fn check_range<T>(field: &str, value: T, min: T, max: T) -> ConfigErrorResult<()>
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        return Err(ConfigError::invalid(format!(
            "{field} must be {min}-{max}, got {value}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests;
