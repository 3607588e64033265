//! Service configuration

use std::time::Duration;

/// Tuning knobs for the bidding core
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum commit attempts per mutating command (version conflicts only)
    pub max_attempts: u32,
    /// Base backoff delay; attempt N sleeps `base_delay * 2^(N-1)`
    pub base_delay_ms: u64,
    /// Capacity of the event broadcast channel
    pub event_channel_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 50,
            event_channel_capacity: 1024,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: std::env::var("BID_MAX_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_attempts),
            base_delay_ms: std::env::var("BID_RETRY_BASE_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.base_delay_ms),
            event_channel_capacity: std::env::var("EVENT_CHANNEL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.event_channel_capacity),
        }
    }

    /// Backoff for the given 1-based attempt number
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms << (attempt.saturating_sub(1)))
    }
}
