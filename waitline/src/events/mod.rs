//! Event bus for queue observability
//!
//! The coordinator and its recalibrator emit a [`QueueEvent`] for every
//! registration, tick, fault and lifecycle change. Consumers (the `wl`
//! binary, tests, metrics exporters) subscribe through
//! [`crate::Coordinator::subscribe`].

mod bus;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus};
pub use types::{QueueEvent, StopReason};
