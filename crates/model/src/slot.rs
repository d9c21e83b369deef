use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

/// Number of seconds covered by one quiz round.
pub const SLOT_SECS: u64 = 600;

/// Identifier of one ten-minute quiz round.
///
/// Every unix second belongs to exactly one slot, so two clients that agree on
/// the time agree on the round being played without any coordination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SlotId(u64);

impl SlotId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Buckets a unix timestamp (in seconds) into its slot.
    pub const fn from_unix(secs: u64) -> Self {
        Self(secs / SLOT_SECS)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// First unix second covered by this slot.
    pub const fn start_unix(self) -> u64 {
        self.0 * SLOT_SECS
    }

    /// First unix second no longer covered by this slot.
    pub const fn end_unix(self) -> u64 {
        self.start_unix() + SLOT_SECS
    }

    /// Seconds left in the round at `now`. Zero once the round has closed.
    pub const fn remaining_secs(self, now: u64) -> u64 {
        let end = self.end_unix();
        if now < end {
            end - now
        } else {
            0
        }
    }
}

impl Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::{SlotId, SLOT_SECS};

    #[test]
    fn buckets_are_aligned_and_exclusive() {
        let slot = SlotId::from_unix(1_700_000_123);
        assert!(slot.start_unix() <= 1_700_000_123);
        assert!(1_700_000_123 < slot.end_unix());
        assert_eq!(slot.end_unix() - slot.start_unix(), SLOT_SECS);
    }

    #[test]
    fn every_second_maps_to_one_slot() {
        let base = SlotId::from_unix(36_000);
        assert_eq!(SlotId::from_unix(36_000 + SLOT_SECS - 1), base);
        assert_ne!(SlotId::from_unix(36_000 + SLOT_SECS), base);
        assert_eq!(SlotId::from_unix(36_000 + SLOT_SECS).get(), base.get() + 1);
    }

    #[test]
    fn remaining_counts_down_to_zero() {
        let slot = SlotId::from_unix(0);
        assert_eq!(slot.remaining_secs(0), SLOT_SECS);
        assert_eq!(slot.remaining_secs(SLOT_SECS - 1), 1);
        assert_eq!(slot.remaining_secs(SLOT_SECS), 0);
        assert_eq!(slot.remaining_secs(SLOT_SECS * 7), 0);
    }
}
