//! Recalibrator - the supervised periodic task behind every coordinator
//!
//! The [`Supervisor`] fires a [`Tick`] on a fixed period. A tick that returns
//! an error or panics is logged and reported on the event bus, then the
//! [`RestartPolicy`] decides whether ticking resumes after a backoff delay or
//! stops for good. A stop signal ends the loop at any point, including
//! mid-backoff.

mod config;
mod supervisor;

pub use config::{BackoffConfig, RecalibratorConfig, RestartPolicy};
pub use supervisor::{RecalibratorState, Supervisor, Tick};
