//! Registry - ordered participants and the recalibration step

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::handle::{Delivery, Entry, Participant};
use super::queue::{QueueStats, TickReport};
use crate::error::QueueError;
use crate::events::{EventBus, QueueEvent};
use crate::recalibrator::Tick;
use crate::status::Status;

/// Internal state protected by mutex
struct RegistryInner {
    /// Participants in arrival order
    entries: Vec<Entry>,

    /// Statistics
    stats: QueueStats,
}

/// Arrival-ordered registry of participants.
///
/// Registration and recalibration take the same lock. The lock is never held
/// across another lock acquisition or a blocking send.
pub(crate) struct Registry {
    admission_window: usize,
    inner: Mutex<RegistryInner>,
    events: EventBus,
}

impl Registry {
    pub(crate) fn new(admission_window: usize, events: EventBus) -> Self {
        debug!(admission_window, "Registry::new: called");
        Self {
            admission_window,
            inner: Mutex::new(RegistryInner {
                entries: Vec::new(),
                stats: QueueStats::default(),
            }),
            events,
        }
    }

    pub(crate) fn admission_window(&self) -> usize {
        self.admission_window
    }

    /// Append a fresh participant at the back of the line
    pub(crate) async fn register(&self) -> Participant {
        let (entry, participant) = Entry::pair();
        let participant_id = entry.id();

        let position = {
            let mut inner = self.inner.lock().await;
            inner.entries.push(entry);
            inner.stats.total_registered += 1;
            inner.stats.peak_registered = inner.stats.peak_registered.max(inner.entries.len());
            inner.entries.len() - 1
        };

        debug!(%participant_id, position, "Registry::register: appended");
        self.events.emit(QueueEvent::Registered {
            participant_id,
            position,
        });
        participant
    }

    /// Compact the registry and push a fresh status to every survivor.
    ///
    /// Entries marked for removal or whose participant was dropped are removed
    /// for good. Survivors keep their relative order; their new index is their
    /// rank. Delivery never blocks: a full slot keeps its older value.
    pub(crate) async fn recalibrate(&self) -> TickReport {
        let mut inner = self.inner.lock().await;

        let before = inner.entries.len();
        inner.entries.retain(Entry::is_live);
        let live = inner.entries.len();

        let mut report = TickReport {
            tick: inner.stats.ticks + 1,
            live,
            dropped: before - live,
            ..Default::default()
        };

        for (rank, entry) in inner.entries.iter().enumerate() {
            match entry.offer(Status::for_rank(rank, self.admission_window)) {
                Delivery::Delivered => report.delivered += 1,
                // Closed slots are compacted out on the next tick
                Delivery::Skipped | Delivery::Closed => report.skipped += 1,
            }
        }

        inner.stats.record_tick(&report);
        drop(inner);

        debug!(
            tick = report.tick,
            live = report.live,
            dropped = report.dropped,
            delivered = report.delivered,
            skipped = report.skipped,
            "Registry::recalibrate: done"
        );
        self.events.emit(QueueEvent::Recalibrated { report });
        report
    }

    /// Number of entries, including ones awaiting compaction
    pub(crate) async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub(crate) async fn stats(&self) -> QueueStats {
        self.inner.lock().await.stats.clone()
    }
}

#[async_trait]
impl Tick for Registry {
    fn name(&self) -> &str {
        "recalibrate"
    }

    async fn tick(&self) -> Result<TickReport, QueueError> {
        Ok(self.recalibrate().await)
    }
}
