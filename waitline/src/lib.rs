//! waitline - in-process admission queue
//!
//! Callers register as participants competing for a capacity-limited
//! resource. The queue ranks them by arrival and keeps telling each one
//! whether it sits inside the admission window or must keep waiting. It does
//! not gate the resource itself: acting on the status is up to the caller.
//!
//! # Architecture
//!
//! ```text
//!   register() ──► Coordinator ──► Registry (arrival order, one lock)
//!                       │                ▲
//!                       │ owns           │ tick every period
//!                       ▼                │
//!                  Supervisor ───────────┘
//!                  (restart policy, backoff, stop signal)
//!
//!   Participant ◄── single-slot channel ── status per rank
//!   Participant ──► removal flag (own lock) ── compacted at next tick
//! ```
//!
//! # Status values
//!
//! With admission window `M`, rank `i` receives `1` when `i < M + 1` and
//! `i - M + 1` otherwise. See [`Status`].
//!
//! # Example
//!
//! ```no_run
//! use waitline::Coordinator;
//!
//! # async fn demo() {
//! let coordinator = Coordinator::with_window(2);
//! let mut participant = coordinator.register().await;
//!
//! while let Some(status) = participant.recv().await {
//!     if status.is_admitted() {
//!         break;
//!     }
//! }
//! participant.request_removal();
//! coordinator.shutdown().await.unwrap();
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod recalibrator;
pub mod simulation;
pub mod status;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{
    Coordinator, Participant, ParticipantId, QueueConfig, QueueState, QueueStats, RemovalHandle, TickReport,
};
pub use error::QueueError;
pub use events::{EventBus, QueueEvent, StopReason};
pub use recalibrator::{BackoffConfig, RecalibratorConfig, RecalibratorState, RestartPolicy, Supervisor, Tick};
pub use status::Status;
