//! Coordinator for the waiting room
//!
//! The Coordinator keeps participants in arrival order and, on every tick,
//! tells each one whether it is inside the admission window:
//! - **Register:** append a participant and hand back its [`Participant`] handle
//! - **Remove:** a participant marks itself; the next tick compacts it out
//! - **Recalibrate:** compact, rank, and push a status into each single-slot channel

mod config;
mod core;
mod handle;
mod queue;
mod registry;

pub use config::QueueConfig;
pub use core::Coordinator;
pub use handle::{Participant, ParticipantId, RemovalHandle};
pub use queue::{QueueState, QueueStats, TickReport};
