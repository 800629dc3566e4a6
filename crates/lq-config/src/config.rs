use crate::{
    ConfigError, ConfigErrorResult, DeliveryConfig, HandlerConfig, LimitsConfig, LoggingConfig,
    ServerConfig, ValidationConfig, WebSocketConfig,
};

use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub websocket: WebSocketConfig,
    pub limits: LimitsConfig,
    pub delivery: DeliveryConfig,
    pub handler: HandlerConfig,
    pub validation: ValidationConfig,
}

impl Config {
    /// Read configuration from `<config_dir>/config.toml`, then layer
    /// `LQ_*` environment overrides on top. A missing file is not an
    /// error; every section has defaults. Validation is separate so
    /// callers can report all startup problems from one place.
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join("config.toml");

        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(contents) => toml::from_str(&contents).map_err(|e| ConfigError::Toml {
                path: config_path.clone(),
                source: e,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(ConfigError::Io {
                    path: config_path,
                    source: e,
                });
            }
        };

        config.apply_env();

        Ok(config)
    }

    /// `LQ_CONFIG_DIR` when set, otherwise `.lq/` under the working
    /// directory.
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Ok(dir) = std::env::var("LQ_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::invalid("Cannot determine current working directory"))?;
        Ok(cwd.join(".lq"))
    }

    /// Run every section's validator. Call once after [`Config::load`].
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.websocket.validate()?;
        self.limits.validate()?;
        self.delivery.validate()?;
        self.handler.validate()?;
        self.validation.validate()?;

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        self.server.addr()
    }

    /// One-line-per-section summary at startup, after the logger is up.
    pub fn log_summary(&self) {
        info!("Configuration:");
        info!("  server: listening on {}", self.bind_addr());

        info!(
            "  logging: {} (colored: {}, file: {})",
            *self.logging.level,
            self.logging.colored,
            self.logging.file.as_deref().unwrap_or("off")
        );

        info!(
            "  websocket: send_buffer={}, heartbeat={}s, timeout={}s",
            self.websocket.send_buffer_size,
            self.websocket.heartbeat_interval_secs,
            self.websocket.heartbeat_timeout_secs
        );

        info!(
            "  limits: connections={}, subscriptions/connection={}",
            self.limits.max_connections, self.limits.max_subscriptions_per_connection
        );

        info!("  delivery: commit_buffer={}", self.delivery.commit_buffer_size);

        info!("  handler: budget={}s", self.handler.timeout_secs);

        info!(
            "  validation: op_id={}, name={}, clauses={}, error_msg={}",
            self.validation.max_operation_id_length,
            self.validation.max_name_length,
            self.validation.max_filter_clauses,
            self.validation.max_error_message_length
        );
    }

    fn apply_env(&mut self) {
        env_parsed("LQ_SERVER_HOST", &mut self.server.host);
        env_parsed("LQ_SERVER_PORT", &mut self.server.port);

        env_parsed("LQ_LOG_LEVEL", &mut self.logging.level);
        env_flag("LQ_LOG_COLORED", &mut self.logging.colored);
        if let Ok(path) = std::env::var("LQ_LOG_FILE") {
            self.logging.file = Some(path);
        }

        env_parsed(
            "LQ_WS_SEND_BUFFER_SIZE",
            &mut self.websocket.send_buffer_size,
        );
        env_parsed(
            "LQ_WS_HEARTBEAT_INTERVAL_SECS",
            &mut self.websocket.heartbeat_interval_secs,
        );
        env_parsed(
            "LQ_WS_HEARTBEAT_TIMEOUT_SECS",
            &mut self.websocket.heartbeat_timeout_secs,
        );

        env_parsed("LQ_LIMITS_MAX_CONNECTIONS", &mut self.limits.max_connections);
        env_parsed(
            "LQ_LIMITS_MAX_SUBSCRIPTIONS_PER_CONNECTION",
            &mut self.limits.max_subscriptions_per_connection,
        );

        env_parsed(
            "LQ_DELIVERY_COMMIT_BUFFER_SIZE",
            &mut self.delivery.commit_buffer_size,
        );

        env_parsed("LQ_HANDLER_TIMEOUT_SECS", &mut self.handler.timeout_secs);

        env_parsed(
            "LQ_VALIDATION_MAX_OPERATION_ID_LENGTH",
            &mut self.validation.max_operation_id_length,
        );
        env_parsed(
            "LQ_VALIDATION_MAX_NAME_LENGTH",
            &mut self.validation.max_name_length,
        );
        env_parsed(
            "LQ_VALIDATION_MAX_FILTER_CLAUSES",
            &mut self.validation.max_filter_clauses,
        );
        env_parsed(
            "LQ_VALIDATION_MAX_ERROR_MESSAGE_LENGTH",
            &mut self.validation.max_error_message_length,
        );
    }
}

/// Overwrite `slot` when the variable is set and parses. Unset or
/// unparseable values leave the TOML/default value in place. Strings go
/// through here too via their infallible `FromStr`.
fn env_parsed<T: FromStr>(name: &str, slot: &mut T) {
    if let Ok(raw) = std::env::var(name)
        && let Ok(value) = raw.parse()
    {
        *slot = value;
    }
}

/// Booleans accept "1" alongside "true" for shell convenience.
fn env_flag(name: &str, slot: &mut bool) {
    if let Ok(raw) = std::env::var(name) {
        *slot = raw == "1" || raw.eq_ignore_ascii_case("true");
    }
}
