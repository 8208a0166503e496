//! Status values pushed to participants

use serde::{Deserialize, Serialize};

/// Status delivered to a participant on each tick.
///
/// `1` means the participant sits inside the admission window and may proceed.
/// Any larger value means it is still waiting, and the value grows with its
/// distance past the window. The two meanings share one integer on purpose:
/// callers that only care about admission use [`Status::is_admitted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(u64);

impl Status {
    /// Status for participants inside the admission window
    pub const ADMITTED: Status = Status(1);

    /// Compute the status for a 0-based rank in the compacted registry.
    ///
    /// Ranks `0..=admission_window` are admitted. Rank `i` past that receives
    /// `i - admission_window + 1`.
    pub fn for_rank(rank: usize, admission_window: usize) -> Self {
        let rank = rank as u64;
        let window = admission_window as u64;
        if rank < window.saturating_add(1) {
            Self::ADMITTED
        } else {
            Status(rank - window + 1)
        }
    }

    /// Raw status value as delivered on the channel
    pub fn value(self) -> u64 {
        self.0
    }

    /// True when the participant may proceed
    pub fn is_admitted(self) -> bool {
        self == Self::ADMITTED
    }
}

impl From<Status> for u64 {
    fn from(status: Status) -> Self {
        status.0
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_window_of_two_with_five_ranks() {
        let statuses: Vec<u64> = (0..5).map(|rank| Status::for_rank(rank, 2).value()).collect();
        assert_eq!(statuses, vec![1, 1, 1, 2, 3]);
    }

    #[test]
    fn test_zero_window() {
        assert_eq!(Status::for_rank(0, 0), Status::ADMITTED);
        assert_eq!(Status::for_rank(1, 0).value(), 2);
        assert_eq!(Status::for_rank(7, 0).value(), 8);
    }

    #[test]
    fn test_huge_window_does_not_overflow() {
        assert!(Status::for_rank(usize::MAX, usize::MAX).is_admitted());
    }

    #[test]
    fn test_display_and_conversion() {
        let status = Status::for_rank(4, 1);
        assert_eq!(status.to_string(), "4");
        assert_eq!(u64::from(status), 4);
        assert!(!status.is_admitted());
    }

    proptest! {
        #[test]
        fn prop_rank_formula(rank in 0usize..10_000, window in 0usize..1_000) {
            let status = Status::for_rank(rank, window);
            if rank <= window {
                prop_assert!(status.is_admitted());
            } else {
                prop_assert_eq!(status.value(), (rank - window + 1) as u64);
                prop_assert!(status.value() >= 2);
            }
        }

        #[test]
        fn prop_status_never_decreases_with_rank(rank in 0usize..10_000, window in 0usize..1_000) {
            prop_assert!(Status::for_rank(rank, window) <= Status::for_rank(rank + 1, window));
        }
    }
}
