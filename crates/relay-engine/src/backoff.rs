//! Exponential backoff curve for agent-path retries.

use rand::Rng;
use relay_config::AgentConfig;
use std::time::Duration;

/// Exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct BackoffCurve {
    base_delay: Duration,
    multiplier: f64,
    jitter: f64,
    max_delay: Duration,
}

impl BackoffCurve {
    /// Build the curve from agent configuration.
    #[must_use]
    pub fn from_config(config: &AgentConfig) -> Self {
        Self {
            base_delay: config.backoff_base,
            multiplier: config.backoff_multiplier,
            jitter: config.backoff_jitter.clamp(0.0, 1.0),
            max_delay: Duration::from_secs(30),
        }
    }

    /// Delay before retry `attempt` (0-indexed).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as f64;
        let delay = base * self.multiplier.powi(attempt as i32);
        let delay = delay.min(self.max_delay.as_millis() as f64);

        let jitter_range = delay * self.jitter;
        let jitter = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };

        Duration::from_millis((delay + jitter).max(0.0) as u64)
    }
}

impl Default for BackoffCurve {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}
