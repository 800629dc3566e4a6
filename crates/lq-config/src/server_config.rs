use crate::{ConfigError, ConfigErrorResult, DEFAULT_HOST, DEFAULT_PORT, MIN_PORT};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Listen address in `host:port` form.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> ConfigErrorResult<()> {
        // Port 0 asks the OS for an ephemeral port; anything else must
        // sit above the privileged range.
        if self.port != 0 && self.port < MIN_PORT {
            return Err(ConfigError::invalid(format!(
                "server.port must be 0 for auto-assign or at least {}, got {}",
                MIN_PORT, self.port
            )));
        }

        Ok(())
    }
}
