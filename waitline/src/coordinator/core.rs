//! Main Coordinator implementation

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::QueueConfig;
use super::handle::Participant;
use super::queue::{QueueState, TickReport};
use super::registry::Registry;
use crate::error::QueueError;
use crate::events::{EventBus, QueueEvent};
use crate::recalibrator::{RecalibratorState, Supervisor};

/// Running recalibrator and the means to stop it
struct RecalibratorTask {
    shutdown_tx: mpsc::Sender<()>,
    join: JoinHandle<()>,
}

/// The Coordinator owns the participant registry and the recalibrator that
/// keeps every participant's status current.
///
/// Dropping a coordinator without calling [`Coordinator::shutdown`] closes the
/// stop channel, so the recalibrator still winds down on its own.
pub struct Coordinator {
    config: QueueConfig,
    registry: Arc<Registry>,
    events: EventBus,
    state_rx: watch::Receiver<RecalibratorState>,
    recalibrator: Mutex<Option<RecalibratorTask>>,
}

impl Coordinator {
    /// Create a coordinator and spawn its recalibrator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: QueueConfig) -> Self {
        debug!(?config, "Coordinator::start: called");
        let events = EventBus::new(config.event_capacity);
        let registry = Arc::new(Registry::new(config.admission_window, events.clone()));

        let (supervisor, state_rx) = Supervisor::new(registry.clone(), config.recalibrator.clone(), events.clone());
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let join = tokio::spawn(supervisor.run(shutdown_rx));

        info!(admission_window = config.admission_window, "Coordinator started");
        Self {
            config,
            registry,
            events,
            state_rx,
            recalibrator: Mutex::new(Some(RecalibratorTask { shutdown_tx, join })),
        }
    }

    /// Create a coordinator with default settings and the given admission window
    pub fn with_window(admission_window: usize) -> Self {
        Self::start(QueueConfig::with_window(admission_window))
    }

    /// Get the configuration this coordinator was started with
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Get the admission window
    pub fn admission_window(&self) -> usize {
        self.registry.admission_window()
    }

    /// Join the back of the line.
    ///
    /// Never fails and never rejects: capacity only affects the status the
    /// participant receives, not whether it is registered.
    pub async fn register(&self) -> Participant {
        debug!("Coordinator::register: called");
        self.registry.register().await
    }

    /// Run one recalibration tick right now, outside the timer
    pub async fn recalibrate_now(&self) -> TickReport {
        debug!("Coordinator::recalibrate_now: called");
        self.registry.recalibrate().await
    }

    /// Subscribe to queue events emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Current lifecycle state of the recalibrator
    pub fn recalibrator_state(&self) -> RecalibratorState {
        *self.state_rx.borrow()
    }

    /// Get current queue state
    pub async fn queue_state(&self) -> QueueState {
        debug!("Coordinator::queue_state: called");
        QueueState {
            registered: self.registry.len().await,
            admission_window: self.registry.admission_window(),
            recalibrator: self.recalibrator_state(),
            stats: self.registry.stats().await,
        }
    }

    /// Stop the recalibrator and wait for it to finish.
    ///
    /// Registration keeps working afterwards, but no further status is
    /// delivered. The wait is bounded by `shutdown_timeout_ms`; past it the
    /// task is aborted and [`QueueError::ShutdownTimeout`] is returned.
    pub async fn shutdown(&self) -> Result<(), QueueError> {
        debug!("Coordinator::shutdown: called");
        let Some(mut task) = self.recalibrator.lock().await.take() else {
            debug!("Coordinator::shutdown: already stopped");
            return Err(QueueError::AlreadyStopped);
        };

        // Err means the recalibrator already exited on its own
        let _ = task.shutdown_tx.send(()).await;

        let timeout = self.config.shutdown_timeout();
        match tokio::time::timeout(timeout, &mut task.join).await {
            Ok(Ok(())) => {
                info!("Coordinator shutdown complete");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Recalibrator task ended abnormally");
                Ok(())
            }
            Err(_) => {
                warn!(?timeout, "Recalibrator did not stop in time, aborting");
                task.join.abort();
                Err(QueueError::ShutdownTimeout { timeout })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recalibrator::RecalibratorConfig;
    use crate::status::Status;
    use std::time::Duration;

    /// Timer far enough out that only `recalibrate_now` ticks
    fn manual(window: usize) -> QueueConfig {
        QueueConfig {
            admission_window: window,
            recalibrator: RecalibratorConfig {
                tick_interval_ms: 3_600_000,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_recalibrate_now() {
        let coordinator = Coordinator::start(manual(1));
        let mut a = coordinator.register().await;
        let mut b = coordinator.register().await;
        let mut c = coordinator.register().await;

        let report = coordinator.recalibrate_now().await;
        assert_eq!(report.live, 3);

        assert_eq!(a.try_recv(), Some(Status::ADMITTED));
        assert_eq!(b.try_recv(), Some(Status::ADMITTED));
        assert_eq!(c.try_recv().map(Status::value), Some(2));
    }

    #[tokio::test]
    async fn test_background_ticks_deliver_status() {
        let config = QueueConfig {
            admission_window: 0,
            recalibrator: RecalibratorConfig {
                tick_interval_ms: 10,
                ..Default::default()
            },
            ..Default::default()
        };
        let coordinator = Coordinator::start(config);
        let mut first = coordinator.register().await;
        let mut second = coordinator.register().await;

        assert_eq!(first.recv_timeout(Duration::from_secs(2)).await, Some(Status::ADMITTED));
        assert_eq!(
            second.recv_timeout(Duration::from_secs(2)).await.map(Status::value),
            Some(2)
        );

        coordinator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_twice() {
        let coordinator = Coordinator::start(manual(0));
        assert_eq!(coordinator.recalibrator_state(), RecalibratorState::Running);

        coordinator.shutdown().await.unwrap();
        assert_eq!(coordinator.recalibrator_state(), RecalibratorState::Stopped);

        assert!(matches!(coordinator.shutdown().await, Err(QueueError::AlreadyStopped)));
    }

    #[tokio::test]
    async fn test_register_after_shutdown() {
        let coordinator = Coordinator::start(manual(0));
        coordinator.shutdown().await.unwrap();

        let mut participant = coordinator.register().await;
        assert_eq!(coordinator.queue_state().await.registered, 1);
        assert_eq!(participant.recv_timeout(Duration::from_millis(20)).await, None);
    }

    #[tokio::test]
    async fn test_queue_state() {
        let coordinator = Coordinator::start(manual(4));
        let _a = coordinator.register().await;
        let b = coordinator.register().await;
        b.request_removal();

        let state = coordinator.queue_state().await;
        assert_eq!(state.registered, 2);
        assert_eq!(state.admission_window, 4);
        assert_eq!(state.stats.total_registered, 2);

        coordinator.recalibrate_now().await;
        let state = coordinator.queue_state().await;
        assert_eq!(state.registered, 1);
        assert_eq!(state.stats.ticks, 1);
        assert_eq!(state.stats.total_dropped, 1);
    }
}
