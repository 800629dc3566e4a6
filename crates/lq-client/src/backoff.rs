use std::time::Duration;

// Reconnect pacing: up to 5 attempts per call, starting at 250ms and
// doubling per failure up to a 10s ceiling. Jitter spreads out mass
// reconnects after a server restart.
const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_DELAY_MS: u64 = 250;
const DEFAULT_MAX_DELAY_SECS: u64 = 10;
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
const DEFAULT_JITTER_ENABLED: bool = true;

/// Pacing for reconnect attempts against a refusing endpoint.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Connection attempts per reconnect call before giving up
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_delay: Duration,
    /// Ceiling for the grown delay
    pub max_delay: Duration,
    /// Growth factor applied after each failure
    pub backoff_multiplier: f64,
    /// Randomize each delay to 50%..150% of nominal
    pub jitter: bool,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
            max_delay: Duration::from_secs(DEFAULT_MAX_DELAY_SECS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: DEFAULT_JITTER_ENABLED,
        }
    }
}

/// Delay sequence for one reconnect call.
#[derive(Debug)]
pub struct Backoff {
    config: ReconnectConfig,
    current_delay: Duration,
}

impl Backoff {
    pub fn new(config: &ReconnectConfig) -> Self {
        Self {
            config: config.clone(),
            current_delay: config.initial_delay,
        }
    }

    /// The delay to sleep before the next attempt. Advances the nominal
    /// delay by the multiplier, capped at `max_delay`.
    pub fn next_delay(&mut self) -> Duration {
        let nominal = self.current_delay;

        let delay = if self.config.jitter {
            let factor = 0.5 + rand::random::<f64>();
            Duration::from_secs_f64(nominal.as_secs_f64() * factor)
        } else {
            nominal
        };

        self.current_delay = Duration::from_secs_f64(
            (nominal.as_secs_f64() * self.config.backoff_multiplier)
                .min(self.config.max_delay.as_secs_f64()),
        );

        delay
    }
}
