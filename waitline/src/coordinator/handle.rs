//! Participant - the caller's side of a queue registration

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;
use uuid::Uuid;

use crate::status::Status;

/// Unique identifier for a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    pub(crate) fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State shared between the registry and the caller.
///
/// The removal flag is its own lock domain, so removal requests never wait on
/// the registry lock.
#[derive(Debug)]
pub(crate) struct Ticket {
    id: ParticipantId,
    removed: AtomicBool,
}

impl Ticket {
    pub(crate) fn new() -> Self {
        Self {
            id: ParticipantId::new(),
            removed: AtomicBool::new(false),
        }
    }

    pub(crate) fn id(&self) -> ParticipantId {
        self.id
    }

    pub(crate) fn is_removed(&self) -> bool {
        self.removed.load(Ordering::Acquire)
    }

    fn request_removal(&self) {
        if !self.removed.swap(true, Ordering::AcqRel) {
            debug!(participant_id = %self.id, "Ticket::request_removal: marked");
        }
    }
}

/// Outcome of offering a status to a participant's slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// The slot was empty and now holds the status
    Delivered,
    /// The slot still held an unread status; the new one was dropped
    Skipped,
    /// The participant dropped its receiver
    Closed,
}

/// Registry-side entry: the shared ticket plus the producer end of the slot
#[derive(Debug)]
pub(crate) struct Entry {
    ticket: Arc<Ticket>,
    slot: mpsc::Sender<Status>,
}

impl Entry {
    /// Create a registry entry and the participant handle that pairs with it
    pub(crate) fn pair() -> (Self, Participant) {
        let ticket = Arc::new(Ticket::new());
        let (slot, rx) = mpsc::channel(1);
        (
            Self {
                ticket: ticket.clone(),
                slot,
            },
            Participant { ticket, rx },
        )
    }

    pub(crate) fn id(&self) -> ParticipantId {
        self.ticket.id()
    }

    /// Live entries are not marked for removal and still have a reader
    pub(crate) fn is_live(&self) -> bool {
        !self.ticket.is_removed() && !self.slot.is_closed()
    }

    /// Non-blocking delivery into the single-slot channel
    pub(crate) fn offer(&self, status: Status) -> Delivery {
        match self.slot.try_send(status) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::Skipped,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Handle returned by [`crate::Coordinator::register`].
///
/// Reads the statuses pushed by the recalibrator and can ask to leave the
/// queue. Only the latest undelivered status is kept: a participant that reads
/// slowly misses intermediate values. Once the participant is compacted out of
/// the registry (or the coordinator is gone) and the slot is drained, `recv`
/// returns `None`.
///
/// Dropping the handle counts as leaving: the next tick compacts it out.
#[derive(Debug)]
pub struct Participant {
    ticket: Arc<Ticket>,
    rx: mpsc::Receiver<Status>,
}

impl Participant {
    /// Get this participant's ID
    pub fn id(&self) -> ParticipantId {
        self.ticket.id()
    }

    /// Ask to be dropped from the queue at the next tick.
    ///
    /// Idempotent. Safe to call after the participant was already compacted out.
    pub fn request_removal(&self) {
        self.ticket.request_removal();
    }

    /// Whether removal was requested through any handle
    pub fn is_removal_requested(&self) -> bool {
        self.ticket.is_removed()
    }

    /// Cloneable handle that can request removal from other tasks
    pub fn remover(&self) -> RemovalHandle {
        RemovalHandle {
            ticket: self.ticket.clone(),
        }
    }

    /// Wait for the next status
    pub async fn recv(&mut self) -> Option<Status> {
        debug!(participant_id = %self.ticket.id(), "Participant::recv: called");
        self.rx.recv().await
    }

    /// Take the pending status without waiting
    pub fn try_recv(&mut self) -> Option<Status> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next status, giving up after `timeout`
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Option<Status> {
        debug!(participant_id = %self.ticket.id(), ?timeout, "Participant::recv_timeout: called");
        tokio::time::timeout(timeout, self.rx.recv()).await.ok().flatten()
    }
}

/// Removal-only view of a participant, shareable across tasks
#[derive(Debug, Clone)]
pub struct RemovalHandle {
    ticket: Arc<Ticket>,
}

impl RemovalHandle {
    /// Participant this handle belongs to
    pub fn id(&self) -> ParticipantId {
        self.ticket.id()
    }

    /// Ask to be dropped from the queue at the next tick (idempotent)
    pub fn request_removal(&self) {
        self.ticket.request_removal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_pair_is_live() {
        let (entry, participant) = Entry::pair();
        assert!(entry.is_live());
        assert_eq!(entry.id(), participant.id());
        assert!(!participant.is_removal_requested());
    }

    #[test]
    fn test_removal_is_idempotent() {
        let (entry, participant) = Entry::pair();
        let remover = participant.remover();

        participant.request_removal();
        participant.request_removal();
        remover.request_removal();

        assert!(participant.is_removal_requested());
        assert!(!entry.is_live());
    }

    #[test]
    fn test_single_slot_drops_when_full() {
        let (entry, mut participant) = Entry::pair();

        assert_eq!(entry.offer(Status::for_rank(3, 0)), Delivery::Delivered);
        assert_eq!(entry.offer(Status::ADMITTED), Delivery::Skipped);

        assert_eq!(participant.try_recv().map(Status::value), Some(4));
        assert_eq!(participant.try_recv(), None);

        assert_eq!(entry.offer(Status::ADMITTED), Delivery::Delivered);
        assert_eq!(participant.try_recv(), Some(Status::ADMITTED));
    }

    #[test]
    fn test_dropped_participant_closes_slot() {
        let (entry, participant) = Entry::pair();
        drop(participant);

        assert!(!entry.is_live());
        assert_eq!(entry.offer(Status::ADMITTED), Delivery::Closed);
    }

    #[tokio::test]
    async fn test_recv_ends_when_entry_dropped() {
        let (entry, mut participant) = Entry::pair();
        entry.offer(Status::ADMITTED);
        drop(entry);

        assert_eq!(participant.recv().await, Some(Status::ADMITTED));
        assert_eq!(participant.recv().await, None);
    }

    #[tokio::test]
    async fn test_recv_timeout_elapses() {
        let (_entry, mut participant) = Entry::pair();
        assert_eq!(participant.recv_timeout(Duration::from_millis(10)).await, None);
    }
}
