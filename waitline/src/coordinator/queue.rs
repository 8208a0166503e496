//! Queue types for reports and snapshots

use serde::{Deserialize, Serialize};

use crate::recalibrator::RecalibratorState;

/// Summary of one recalibration tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick sequence number, starting at 1
    pub tick: u64,
    /// Participants left in the registry after compaction
    pub live: usize,
    /// Participants compacted out by this tick
    pub dropped: usize,
    /// Statuses placed into empty slots
    pub delivered: usize,
    /// Statuses dropped because the slot still held an unread value
    pub skipped: usize,
}

/// Statistics for the queue
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub total_registered: u64,
    pub total_dropped: u64,
    pub ticks: u64,
    pub statuses_delivered: u64,
    pub statuses_skipped: u64,
    pub peak_registered: usize,
}

impl QueueStats {
    pub(crate) fn record_tick(&mut self, report: &TickReport) {
        self.ticks = report.tick;
        self.total_dropped += report.dropped as u64;
        self.statuses_delivered += report.delivered as u64;
        self.statuses_skipped += report.skipped as u64;
    }
}

/// Snapshot of the queue for observers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueState {
    /// Entries currently in the registry, including ones awaiting compaction
    pub registered: usize,
    pub admission_window: usize,
    pub recalibrator: RecalibratorState,
    pub stats: QueueStats,
}
