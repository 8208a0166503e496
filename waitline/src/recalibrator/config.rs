//! Recalibrator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the supervisor does after a tick faults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    /// Stop ticking for good after the first fault
    Never,
    /// Resume ticking after a backoff delay
    #[default]
    OnFailure,
}

/// Delay between a fault and the next tick attempt
///
/// Attempt `n` waits `first × factor^n`, capped at `max`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay before the first restart, in milliseconds
    #[serde(rename = "first-ms")]
    pub first_ms: u64,

    /// Upper bound for any delay, in milliseconds
    #[serde(rename = "max-ms")]
    pub max_ms: u64,

    /// Growth factor per consecutive fault
    pub factor: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            first_ms: 100,
            max_ms: 30_000,
            factor: 2.0,
        }
    }
}

impl BackoffConfig {
    /// Delay for the given consecutive fault count (0-indexed)
    pub fn delay(&self, attempt: u32) -> Duration {
        let max = Duration::from_millis(self.max_ms);
        let exp = attempt.min(i32::MAX as u32) as i32;
        let secs = Duration::from_millis(self.first_ms).as_secs_f64() * self.factor.powi(exp);

        if !secs.is_finite() || secs < 0.0 || secs > max.as_secs_f64() {
            max
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// Recalibrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecalibratorConfig {
    /// Period between ticks, in milliseconds
    #[serde(rename = "tick-interval-ms")]
    pub tick_interval_ms: u64,

    /// Policy applied after a faulted tick
    pub restart: RestartPolicy,

    /// Restart budget (0 = unlimited); consecutive faults only
    #[serde(rename = "max-restarts")]
    pub max_restarts: u32,

    /// Backoff between restarts
    pub backoff: BackoffConfig,
}

impl Default for RecalibratorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 300,
            restart: RestartPolicy::default(),
            max_restarts: 0,
            backoff: BackoffConfig::default(),
        }
    }
}

impl RecalibratorConfig {
    /// Get the tick interval as a Duration (at least 1ms)
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Whether another restart is allowed after `restarts` consecutive ones
    pub fn allows_restart(&self, restarts: u32) -> bool {
        match self.restart {
            RestartPolicy::Never => false,
            RestartPolicy::OnFailure => self.max_restarts == 0 || restarts < self.max_restarts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RecalibratorConfig::default();
        assert_eq!(config.tick_interval_ms, 300);
        assert_eq!(config.restart, RestartPolicy::OnFailure);
        assert_eq!(config.max_restarts, 0);
        assert_eq!(config.tick_interval(), Duration::from_millis(300));
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = RecalibratorConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_backoff_growth_and_cap() {
        let backoff = BackoffConfig {
            first_ms: 100,
            max_ms: 1_000,
            factor: 2.0,
        };
        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(4), Duration::from_millis(1_000));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_millis(1_000));
    }

    #[test]
    fn test_allows_restart() {
        let never = RecalibratorConfig {
            restart: RestartPolicy::Never,
            ..Default::default()
        };
        assert!(!never.allows_restart(0));

        let bounded = RecalibratorConfig {
            max_restarts: 2,
            ..Default::default()
        };
        assert!(bounded.allows_restart(0));
        assert!(bounded.allows_restart(1));
        assert!(!bounded.allows_restart(2));

        let unlimited = RecalibratorConfig::default();
        assert!(unlimited.allows_restart(1_000_000));
    }

    #[test]
    fn test_policy_yaml() {
        let config: RecalibratorConfig = serde_yaml::from_str("restart: never\ntick-interval-ms: 50\n").unwrap();
        assert_eq!(config.restart, RestartPolicy::Never);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.backoff.first_ms, 100);
    }
}
