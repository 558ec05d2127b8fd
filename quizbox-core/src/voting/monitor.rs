//! Light-sensor vote monitor
//!
//! A vote fires when a sensor transitions INTO the trigger level and the
//! shared cooldown has elapsed. Holding a sensor covered never produces a
//! second vote; it has to be uncovered and covered again.
//!
//! Both sensors share one cooldown clock, so a vote on one side silences
//! the other for the cooldown as well.

use crate::traits::Level;

/// Minimum time between two accepted votes (either side)
pub const DEFAULT_COOLDOWN_MS: u32 = 3000;

/// Which sensor (and answer) a vote is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    /// First answer; the pointer turns positive
    A,
    /// Second answer; the pointer turns negative
    B,
}

impl Side {
    /// Both sides in evaluation order
    pub const ALL: [Side; 2] = [Side::A, Side::B];

    /// Signed feedback move for this side
    pub fn feedback_steps(self, magnitude: i32) -> i32 {
        match self {
            Side::A => magnitude,
            Side::B => -magnitude,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

/// Edge + cooldown detector for the two vote sensors
#[derive(Debug, Clone)]
pub struct VoteMonitor {
    /// Level that means "covered"
    trigger: Level,
    /// Shared cooldown in milliseconds
    cooldown_ms: u32,
    /// Last observed level per sensor; None until the first poll
    last_level: [Option<Level>; 2],
    /// Time of the last accepted vote
    last_vote_ms: Option<u64>,
}

impl VoteMonitor {
    /// Create a monitor
    ///
    /// # Arguments
    /// - `trigger`: Sensor level interpreted as "covered"
    /// - `cooldown_ms`: Minimum time between votes, shared by both sensors
    pub fn new(trigger: Level, cooldown_ms: u32) -> Self {
        Self {
            trigger,
            cooldown_ms,
            last_level: [None; 2],
            last_vote_ms: None,
        }
    }

    /// Evaluate one sensor sample pair
    ///
    /// Both last-observed levels are updated on every call, whether or not
    /// a vote fires. The first sample after boot only primes the edge
    /// detector.
    ///
    /// # Arguments
    /// - `now_ms`: Monotonic time in milliseconds
    /// - `levels`: Current levels of sensor A and sensor B
    ///
    /// # Returns
    /// The side that voted, if any. At most one vote per call; sensor A
    /// is evaluated first.
    pub fn poll(&mut self, now_ms: u64, levels: [Level; 2]) -> Option<Side> {
        let mut vote = None;

        for side in Side::ALL {
            let i = side.index();
            let rising = levels[i] == self.trigger
                && matches!(self.last_level[i], Some(prev) if prev != self.trigger);

            if rising && vote.is_none() && self.cooldown_elapsed(now_ms) {
                self.last_vote_ms = Some(now_ms);
                vote = Some(side);
            }

            self.last_level[i] = Some(levels[i]);
        }

        vote
    }

    /// Check if the shared cooldown has passed
    pub fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        match self.last_vote_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) > u64::from(self.cooldown_ms),
        }
    }

    /// Get the configured trigger level
    pub fn trigger(&self) -> Level {
        self.trigger
    }
}
