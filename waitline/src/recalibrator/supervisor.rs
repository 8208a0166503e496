//! Supervisor - runs a periodic job, catching faults and restarting it

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::config::RecalibratorConfig;
use crate::coordinator::TickReport;
use crate::error::QueueError;
use crate::events::{EventBus, QueueEvent, StopReason};

/// A unit of periodic work driven by the [`Supervisor`]
#[async_trait]
pub trait Tick: Send + Sync + 'static {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Run one tick
    async fn tick(&self) -> Result<TickReport, QueueError>;
}

/// Lifecycle of the recalibration task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecalibratorState {
    /// Ticking on schedule
    Running,
    /// Waiting out a backoff delay after a fault
    Restarting { attempt: u32 },
    /// Stopped by shutdown
    Stopped,
    /// Stopped because the restart policy gave up
    Failed,
}

impl std::fmt::Display for RecalibratorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Restarting { attempt } => write!(f, "restarting (attempt {})", attempt),
            Self::Stopped => write!(f, "stopped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Drives a [`Tick`] on a fixed period until told to stop
pub struct Supervisor {
    job: Arc<dyn Tick>,
    config: RecalibratorConfig,
    events: EventBus,
    state: watch::Sender<RecalibratorState>,
}

impl Supervisor {
    /// Create a supervisor and a receiver that tracks its state
    pub fn new(
        job: Arc<dyn Tick>,
        config: RecalibratorConfig,
        events: EventBus,
    ) -> (Self, watch::Receiver<RecalibratorState>) {
        debug!(job = job.name(), ?config, "Supervisor::new: called");
        let (state, state_rx) = watch::channel(RecalibratorState::Running);
        (
            Self {
                job,
                config,
                events,
                state,
            },
            state_rx,
        )
    }

    /// Run until a shutdown signal arrives, the sender is dropped, or the
    /// restart policy gives up.
    ///
    /// The first tick fires one period after start.
    pub async fn run(self, mut shutdown_rx: mpsc::Receiver<()>) {
        let period = self.config.tick_interval();
        let interval_ms = period.as_millis() as u64;
        info!(job = self.job.name(), interval_ms, "Recalibrator started");
        self.events.emit(QueueEvent::RecalibratorStarted { interval_ms });

        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // Consecutive faults; any successful tick resets it
        let mut restarts: u32 = 0;

        let reason = loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Supervisor::run: shutdown signal received");
                    break StopReason::Shutdown;
                }
                _ = interval.tick() => {
                    let err = match self.tick_once().await {
                        Ok(report) => {
                            debug!(tick = report.tick, live = report.live, dropped = report.dropped, "Supervisor::run: tick ok");
                            restarts = 0;
                            continue;
                        }
                        Err(err) => err,
                    };

                    error!(
                        job = self.job.name(),
                        attempt = restarts,
                        label = err.as_label(),
                        error = %err,
                        "Recalibration tick failed"
                    );
                    self.events.emit(QueueEvent::RecalibratorFailed {
                        attempt: restarts,
                        label: err.as_label().to_string(),
                        error: err.to_string(),
                    });

                    if !self.config.allows_restart(restarts) {
                        break StopReason::RestartsExhausted;
                    }

                    let delay = self.config.backoff.delay(restarts);
                    restarts += 1;
                    warn!(job = self.job.name(), attempt = restarts, ?delay, "Recalibrator restarting after backoff");
                    self.state.send_replace(RecalibratorState::Restarting { attempt: restarts });
                    self.events.emit(QueueEvent::RecalibratorRestarting {
                        attempt: restarts,
                        delay_ms: delay.as_millis() as u64,
                    });

                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            debug!("Supervisor::run: shutdown during backoff");
                            break StopReason::Shutdown;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }

                    interval.reset_immediately();
                    self.state.send_replace(RecalibratorState::Running);
                }
            }
        };

        let final_state = match reason {
            StopReason::Shutdown => RecalibratorState::Stopped,
            StopReason::RestartsExhausted => RecalibratorState::Failed,
        };
        self.state.send_replace(final_state);
        info!(job = self.job.name(), ?reason, "Recalibrator stopped");
        self.events.emit(QueueEvent::RecalibratorStopped { reason });
    }

    /// Run one tick, turning a panic into a [`QueueError::TickPanicked`]
    async fn tick_once(&self) -> Result<TickReport, QueueError> {
        match AssertUnwindSafe(self.job.tick()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(QueueError::from_panic(payload)),
        }
    }
}
