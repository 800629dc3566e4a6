mod config;
mod validation;

use crate::{Config, ConfigErrorResult};

use std::env;

use tempfile::TempDir;

/// Scoped environment override. Restores the previous value (or absence)
/// on drop, so `#[serial]` tests cannot leak state into each other.
pub(crate) struct EnvGuard {
    key: &'static str,
    saved: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        let saved = env::var(key).ok();
        unsafe { env::set_var(key, value) };
        Self { key, saved }
    }

    #[allow(dead_code)]
    pub(crate) fn remove(key: &'static str) -> Self {
        let saved = env::var(key).ok();
        unsafe { env::remove_var(key) };
        Self { key, saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match self.saved.take() {
                Some(value) => env::set_var(self.key, value),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// Point LQ_CONFIG_DIR at a fresh temp dir so tests never read a real
/// config.toml. Both returned guards must stay alive for the test body.
pub(crate) fn temp_config_dir() -> (TempDir, EnvGuard) {
    let temp = TempDir::new().unwrap();
    let guard = EnvGuard::set("LQ_CONFIG_DIR", temp.path().to_str().unwrap());
    (temp, guard)
}

/// Load under the current environment and run the validators. The bounds
/// tests only care about the validation verdict.
pub(crate) fn validate_loaded() -> ConfigErrorResult<()> {
    Config::load().unwrap().validate()
}
