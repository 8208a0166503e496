//! Queue configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::events::DEFAULT_CHANNEL_CAPACITY;
use crate::recalibrator::RecalibratorConfig;

/// Queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Ranks `0..=admission_window` are admitted
    #[serde(rename = "admission-window")]
    pub admission_window: usize,

    /// How long `shutdown` waits for the recalibrator before aborting it
    #[serde(rename = "shutdown-timeout-ms")]
    pub shutdown_timeout_ms: u64,

    /// Event bus capacity
    #[serde(rename = "event-capacity")]
    pub event_capacity: usize,

    /// Periodic recalibration settings
    pub recalibrator: RecalibratorConfig,
}

impl Default for QueueConfig {
    fn default() -> Self {
        debug!("QueueConfig::default: called");
        Self {
            admission_window: 10,
            shutdown_timeout_ms: 5_000,
            event_capacity: DEFAULT_CHANNEL_CAPACITY,
            recalibrator: RecalibratorConfig::default(),
        }
    }
}

impl QueueConfig {
    /// Default configuration with the given admission window
    pub fn with_window(admission_window: usize) -> Self {
        Self {
            admission_window,
            ..Default::default()
        }
    }

    /// Get the shutdown timeout as a Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
