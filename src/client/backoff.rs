//! Retry backoff schedule

use std::time::Duration;

use crate::config::ClientConfig;

/// Capped exponential backoff
///
/// Attempt `n > 0` waits `min(base * 2^(n-1), max)`; the first attempt
/// never waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.base_delay, config.max_delay)
    }

    /// Delay to wait before attempt number `attempt` (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }

    /// Sum of every wait scheduled across `attempts` attempts
    pub fn total(&self, attempts: u32) -> Duration {
        (0..attempts).map(|n| self.delay(n)).sum()
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}
