use std::future::pending;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{Instant, sleep, timeout};

// Polling defaults sized for eventually-consistent server state:
// - Sample every 200ms (fast enough for sub-second convergence)
// - Give up after 10 seconds of wall-clock time
const DEFAULT_POLL_INTERVAL_MS: u64 = 200;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for an eventual-condition wait.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Fixed delay between samples
    pub interval: Duration,
    /// Wall-clock budget for the whole wait
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl WaitConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self { interval, timeout }
    }

    /// Keep the default interval, override only the budget.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Why a wait ended without the condition holding.
#[derive(Error, Debug)]
pub enum WaitError<E>
where
    E: std::error::Error + 'static,
{
    /// The condition never held within the configured budget.
    #[error("condition not met within {timeout:?} after {polls} polls")]
    TimeoutExceeded { timeout: Duration, polls: u32 },

    /// The cancel signal fired before the condition held.
    #[error("wait cancelled after {polls} polls")]
    Cancelled { polls: u32 },

    /// The producer failed. The wait stops at the first error; a failing
    /// producer is a bug, not an unmet condition.
    #[error("producer failed while waiting: {0}")]
    Producer(#[source] E),
}

impl<E> WaitError<E>
where
    E: std::error::Error + 'static,
{
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutExceeded { .. })
    }
}

/// Sample `producer` at a fixed interval until `condition` holds for the
/// produced value, then resolve with that value.
///
/// The first sample runs immediately, so a condition that is already true
/// costs no sleep. Each sample is clamped to the remaining budget; a stalled
/// producer cannot extend the wait past `config.timeout`. Concurrent waits
/// are independent: nothing here is shared, each call owns its own timer
/// state.
pub async fn wait_until<F, Fut, T, E, P>(
    config: &WaitConfig,
    producer: F,
    condition: P,
) -> Result<T, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
    P: FnMut(&T) -> bool,
{
    wait_until_or(config, producer, condition, pending::<()>()).await
}

/// [`wait_until`] with an explicit cancel signal.
///
/// When `cancel` completes before the condition holds, the wait stops with
/// [`WaitError::Cancelled`] instead of running out its budget. Any sleep or
/// in-flight sample is abandoned at that point.
pub async fn wait_until_or<F, Fut, T, E, P, C>(
    config: &WaitConfig,
    mut producer: F,
    mut condition: P,
    cancel: C,
) -> Result<T, WaitError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::error::Error + 'static,
    P: FnMut(&T) -> bool,
    C: Future<Output = ()>,
{
    let deadline = Instant::now() + config.timeout;
    let mut polls: u32 = 0;
    tokio::pin!(cancel);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            log::debug!("wait timed out after {polls} polls");
            return Err(WaitError::TimeoutExceeded {
                timeout: config.timeout,
                polls,
            });
        }

        let sampled = tokio::select! {
            biased;
            _ = &mut cancel => return Err(WaitError::Cancelled { polls }),
            sampled = timeout(remaining, producer()) => sampled,
        };
        polls += 1;

        match sampled {
            Ok(Ok(value)) if condition(&value) => return Ok(value),
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                log::debug!("wait aborted by producer error after {polls} polls: {e}");
                return Err(WaitError::Producer(e));
            }
            // Producer outlived the budget
            Err(_) => {
                log::debug!("wait timed out inside poll {polls}");
                return Err(WaitError::TimeoutExceeded {
                    timeout: config.timeout,
                    polls,
                });
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            log::debug!("wait timed out after {polls} polls");
            return Err(WaitError::TimeoutExceeded {
                timeout: config.timeout,
                polls,
            });
        }
        tokio::select! {
            biased;
            _ = &mut cancel => return Err(WaitError::Cancelled { polls }),
            _ = sleep(config.interval.min(remaining)) => {}
        }
    }
}
