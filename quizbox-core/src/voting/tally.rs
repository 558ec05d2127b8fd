//! Pending vote counters

/// Snapshot of both pending counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoteCounts {
    /// Votes for answer A (sensor A)
    pub a: u32,
    /// Votes for answer B (sensor B)
    pub b: u32,
}

/// Votes accumulated since the last drain
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    counts: VoteCounts,
}

impl VoteTally {
    /// Create an empty tally
    pub const fn new() -> Self {
        Self {
            counts: VoteCounts { a: 0, b: 0 },
        }
    }

    /// Count one vote for a side
    pub fn record(&mut self, side: super::Side) {
        let counter = match side {
            super::Side::A => &mut self.counts.a,
            super::Side::B => &mut self.counts.b,
        };
        *counter = counter.saturating_add(1);
    }

    /// Peek at the pending counts without resetting them
    pub fn pending(&self) -> VoteCounts {
        self.counts
    }

    /// Report both counts, then reset both
    ///
    /// Both counts come from one snapshot taken before the reset.
    pub fn drain(&mut self) -> VoteCounts {
        let snapshot = self.counts;
        self.counts = VoteCounts::default();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::super::Side;
    use super::*;

    #[test]
    fn test_record_and_drain() {
        let mut tally = VoteTally::new();
        tally.record(Side::A);
        tally.record(Side::A);
        tally.record(Side::B);
        assert_eq!(tally.pending(), VoteCounts { a: 2, b: 1 });

        assert_eq!(tally.drain(), VoteCounts { a: 2, b: 1 });
        assert_eq!(tally.pending(), VoteCounts::default());
    }

    #[test]
    fn test_second_drain_is_empty() {
        let mut tally = VoteTally::new();
        tally.record(Side::B);
        assert_eq!(tally.drain(), VoteCounts { a: 0, b: 1 });
        assert_eq!(tally.drain(), VoteCounts::default());
    }

    #[test]
    fn test_vote_after_drain_goes_to_next_poll() {
        let mut tally = VoteTally::new();
        tally.record(Side::A);
        let first = tally.drain();
        tally.record(Side::A);
        assert_eq!(first, VoteCounts { a: 1, b: 0 });
        assert_eq!(tally.drain(), VoteCounts { a: 1, b: 0 });
    }

    #[test]
    fn test_counter_saturates() {
        let mut tally = VoteTally {
            counts: VoteCounts { a: u32::MAX, b: 0 },
        };
        tally.record(Side::A);
        assert_eq!(tally.pending().a, u32::MAX);
    }
}
