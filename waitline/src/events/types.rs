//! Event types emitted by the queue

use serde::{Deserialize, Serialize};

use crate::coordinator::{ParticipantId, TickReport};

/// Why the recalibrator stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopReason {
    /// Shutdown was requested or the coordinator was dropped
    Shutdown,
    /// The restart policy forbids another attempt
    RestartsExhausted,
}

/// Observable queue activity
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    // === Registry ===
    /// A participant joined the queue
    Registered { participant_id: ParticipantId, position: usize },

    /// A tick compacted the registry and pushed statuses
    Recalibrated { report: TickReport },

    // === Recalibrator lifecycle ===
    /// The recalibrator started ticking
    RecalibratorStarted { interval_ms: u64 },

    /// A tick faulted
    RecalibratorFailed { attempt: u32, label: String, error: String },

    /// The recalibrator will resume after a backoff delay
    RecalibratorRestarting { attempt: u32, delay_ms: u64 },

    /// The recalibrator stopped for good
    RecalibratorStopped { reason: StopReason },
}

impl QueueEvent {
    /// Event name for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            QueueEvent::Registered { .. } => "Registered",
            QueueEvent::Recalibrated { .. } => "Recalibrated",
            QueueEvent::RecalibratorStarted { .. } => "RecalibratorStarted",
            QueueEvent::RecalibratorFailed { .. } => "RecalibratorFailed",
            QueueEvent::RecalibratorRestarting { .. } => "RecalibratorRestarting",
            QueueEvent::RecalibratorStopped { .. } => "RecalibratorStopped",
        }
    }
}
