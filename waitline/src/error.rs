//! Error types for the queue runtime

use std::time::Duration;

use thiserror::Error;

/// Errors raised by the queue runtime.
///
/// Registration and removal requests never fail; these cover the
/// recalibration task and its lifecycle only.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The recalibrator did not stop within the shutdown deadline and was aborted
    #[error("Recalibrator did not stop within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },

    /// Shutdown was already requested for this coordinator
    #[error("Recalibrator already stopped")]
    AlreadyStopped,

    /// A tick reported a failure
    #[error("Tick failed: {reason}")]
    TickFailed { reason: String },

    /// A tick panicked
    #[error("Tick panicked: {message}")]
    TickPanicked { message: String },
}

impl QueueError {
    /// Short stable label for logs and events
    pub fn as_label(&self) -> &'static str {
        match self {
            QueueError::ShutdownTimeout { .. } => "shutdown_timeout",
            QueueError::AlreadyStopped => "already_stopped",
            QueueError::TickFailed { .. } => "tick_failed",
            QueueError::TickPanicked { .. } => "tick_panicked",
        }
    }

    /// Build a [`QueueError::TickPanicked`] from a caught panic payload
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        QueueError::TickPanicked { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(QueueError::AlreadyStopped.as_label(), "already_stopped");
        assert_eq!(
            QueueError::ShutdownTimeout {
                timeout: Duration::from_secs(1)
            }
            .as_label(),
            "shutdown_timeout"
        );
    }

    #[test]
    fn test_from_panic_payloads() {
        let err = QueueError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "Tick panicked: boom");

        let err = QueueError::from_panic(Box::new(String::from("owned boom")));
        assert!(matches!(err, QueueError::TickPanicked { ref message } if message == "owned boom"));

        let err = QueueError::from_panic(Box::new(42u32));
        assert_eq!(err.as_label(), "tick_panicked");
    }
}
