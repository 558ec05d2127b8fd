//! Non-blocking stepper position controller
//!
//! Owns the absolute micro-step position and target of the pointer motor.
//! [`MotionController::advance`] is called once per control-loop
//! iteration and takes at most one micro-step, so motion never starves
//! the network or display.
//!
//! Relative moves are additive: a request while moving is summed into the
//! outstanding target instead of replacing it. If that leaves too little
//! room to brake, the rotor runs past the target at full deceleration and
//! comes back, so it only ever stops from creep speed.

use crate::traits::{CoilDriver, HALF_STEP_PHASES};

use super::profile::SpeedProfile;

/// Current motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// At target, coils released
    Idle,
    /// Speeding up toward maximum speed
    Accelerating,
    /// At maximum speed
    Cruising,
    /// Braking toward the target (or before a reversal)
    Decelerating,
}

/// Errors from motion requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Requested relative move exceeds the per-request safety bound
    LimitExceeded {
        /// Requested micro-steps
        requested: i32,
        /// Largest accepted magnitude
        limit: u32,
    },
}

/// Position controller for one coil-driven stepper
pub struct MotionController<C> {
    coils: C,
    profile: SpeedProfile,
    /// Largest accepted |delta| per request
    max_move: u32,
    /// Micro-steps since power-on
    position: i32,
    target: i32,
    /// Speed the last step was taken at (steps/s)
    speed: f32,
    /// Travel direction of the last step: -1, 0 (standstill) or 1
    direction: i32,
    interval_us: u32,
    last_step_us: u64,
    energized: bool,
    state: MotionState,
}

impl<C: CoilDriver> MotionController<C> {
    /// Create a controller at position zero with coils released
    ///
    /// # Arguments
    /// - `coils`: Coil driver
    /// - `profile`: Speed/acceleration limits
    /// - `max_move`: Largest relative move accepted per request
    pub fn new(mut coils: C, profile: SpeedProfile, max_move: u32) -> Self {
        coils.release();
        Self {
            coils,
            profile,
            max_move,
            position: 0,
            target: 0,
            speed: 0.0,
            direction: 0,
            interval_us: 0,
            last_step_us: 0,
            energized: false,
            state: MotionState::Idle,
        }
    }

    /// Queue a relative move
    ///
    /// The new target is the outstanding target plus `delta`. Requests
    /// larger than the safety bound are rejected without touching state.
    ///
    /// # Returns
    /// The new absolute target
    pub fn enqueue_relative(&mut self, delta: i32) -> Result<i32, MotionError> {
        if delta.unsigned_abs() > self.max_move {
            return Err(MotionError::LimitExceeded {
                requested: delta,
                limit: self.max_move,
            });
        }
        self.target = self.target.saturating_add(delta);
        Ok(self.target)
    }

    /// Advance the motor by at most one micro-step
    ///
    /// # Arguments
    /// - `now_us`: Monotonic time in microseconds
    ///
    /// # Returns
    /// `true` while a move is still outstanding
    pub fn advance(&mut self, now_us: u64) -> bool {
        if self.can_stop() {
            // A request may cancel itself out before the first step
            if self.energized {
                self.stop();
            }
            return false;
        }

        if !self.energized {
            // Hold the current phase; the first step is due immediately
            self.coils.apply(self.phase());
            self.energized = true;
            self.interval_us = 0;
            self.last_step_us = now_us;
        }

        if now_us.saturating_sub(self.last_step_us) < u64::from(self.interval_us) {
            return true;
        }

        self.step(now_us);

        if self.can_stop() {
            self.stop();
            return false;
        }
        true
    }

    /// On target and slow enough to halt without losing steps
    fn can_stop(&self) -> bool {
        self.position == self.target && self.speed <= self.profile.min_speed()
    }

    /// Take one micro-step and plan the next
    fn step(&mut self, now_us: u64) {
        let wanted = (self.target - self.position).signum();
        // Keep momentum until braked to a standstill before reversing
        let dir = if self.direction != 0 && self.direction != wanted {
            self.direction
        } else {
            wanted
        };

        self.position += dir;
        self.coils.apply(self.phase());

        let ahead = (self.target - self.position) * dir;
        let previous = self.speed;
        self.speed = self.profile.next_speed(previous, ahead);
        self.direction = if self.speed > 0.0 { dir } else { 0 };
        self.interval_us = self.profile.interval_us(self.speed);
        self.last_step_us = now_us;

        self.state = if self.speed > previous {
            MotionState::Accelerating
        } else if self.speed < previous {
            MotionState::Decelerating
        } else {
            MotionState::Cruising
        };
    }

    /// Arrived: zero the speed and release the coils
    fn stop(&mut self) {
        self.coils.release();
        self.energized = false;
        self.speed = 0.0;
        self.direction = 0;
        self.interval_us = 0;
        self.state = MotionState::Idle;
    }

    /// Half-step phase for the current position
    fn phase(&self) -> u8 {
        self.position.rem_euclid(i32::from(HALF_STEP_PHASES)) as u8
    }

    /// Check if no move is outstanding
    ///
    /// A rotor passing through its target too fast to stop is not idle.
    pub fn is_idle(&self) -> bool {
        self.position == self.target && !self.energized
    }

    /// Micro-steps still to go (signed)
    pub fn distance_to_go(&self) -> i32 {
        self.target - self.position
    }

    /// Current absolute position in micro-steps
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Current absolute target in micro-steps
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Configured maximum speed in steps per second
    pub fn max_speed(&self) -> u32 {
        self.profile.max_speed() as u32
    }

    /// Largest relative move accepted per request
    pub fn max_move(&self) -> u32 {
        self.max_move
    }

    /// Check if the coils are currently driven
    pub fn is_energized(&self) -> bool {
        self.energized
    }

    /// Get the current motion state
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Access the coil driver
    pub fn coils(&self) -> &C {
        &self.coils
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Mock coil driver that records what it was told
    #[derive(Default)]
    struct RecordingCoils {
        phase: Option<u8>,
        applies: usize,
        releases: usize,
    }

    impl CoilDriver for RecordingCoils {
        fn apply(&mut self, phase: u8) {
            assert!(phase < HALF_STEP_PHASES);
            self.phase = Some(phase);
            self.applies += 1;
        }

        fn release(&mut self) {
            self.phase = None;
            self.releases += 1;
        }
    }

    const MAX_MOVE: u32 = 8192;

    fn controller() -> MotionController<RecordingCoils> {
        MotionController::new(
            RecordingCoils::default(),
            SpeedProfile::new(1000, 500),
            MAX_MOVE,
        )
    }

    /// Run until idle with a 100us loop period, returning the end time
    fn run_to_idle(ctrl: &mut MotionController<RecordingCoils>, mut now_us: u64) -> u64 {
        let mut iterations = 0u32;
        while ctrl.advance(now_us) {
            now_us += 100;
            iterations += 1;
            assert!(iterations < 2_000_000, "move never finished");
        }
        now_us
    }

    #[test]
    fn test_initial_state() {
        let mut ctrl = controller();
        assert!(ctrl.is_idle());
        assert_eq!(ctrl.position(), 0);
        assert_eq!(ctrl.state(), MotionState::Idle);
        assert!(!ctrl.advance(0));
        assert!(!ctrl.is_energized());
        assert_eq!(ctrl.coils().applies, 0);
    }

    #[test]
    fn test_rejects_oversized_move() {
        let mut ctrl = controller();
        let err = ctrl.enqueue_relative(8193).unwrap_err();
        assert_eq!(
            err,
            MotionError::LimitExceeded {
                requested: 8193,
                limit: MAX_MOVE
            }
        );
        assert!(ctrl.enqueue_relative(-8193).is_err());
        assert_eq!(ctrl.target(), 0);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn test_accepts_bound_exactly() {
        let mut ctrl = controller();
        assert_eq!(ctrl.enqueue_relative(8192), Ok(8192));
        assert_eq!(ctrl.enqueue_relative(-8192), Ok(0));
    }

    #[test]
    fn test_move_reaches_target_and_releases() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(300).unwrap();

        assert!(ctrl.advance(0));
        assert!(ctrl.is_energized());
        assert_eq!(ctrl.position(), 1);

        run_to_idle(&mut ctrl, 100);
        assert_eq!(ctrl.position(), 300);
        assert!(!ctrl.is_energized());
        assert_eq!(ctrl.coils().phase, None);
        assert_eq!(ctrl.state(), MotionState::Idle);
    }

    #[test]
    fn test_requests_are_additive() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(100).unwrap();
        for t in 0..20 {
            ctrl.advance(t * 1000);
        }
        assert!(ctrl.position() > 0);
        assert_eq!(ctrl.enqueue_relative(50), Ok(150));

        run_to_idle(&mut ctrl, 20_000);
        assert_eq!(ctrl.position(), 150);
    }

    #[test]
    fn test_reversal_brakes_then_lands_on_target() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(2000).unwrap();
        let mut now = 0;
        while ctrl.position() < 800 {
            ctrl.advance(now);
            now += 100;
        }
        ctrl.enqueue_relative(-2500).unwrap();

        let mut furthest = ctrl.position();
        while ctrl.advance(now) {
            furthest = furthest.max(ctrl.position());
            now += 100;
        }
        // Momentum carried it past the reversal point before turning
        assert!(furthest > 800);
        assert_eq!(ctrl.position(), -500);
    }

    /// Largest speed a final step may be taken at: one braking step above
    /// the halt threshold
    fn max_arrival_speed(ctrl: &MotionController<RecordingCoils>) -> f32 {
        let min = ctrl.profile.min_speed();
        libm::sqrtf(2.0 * min * min + 2.0 * ctrl.profile.acceleration()) + 0.01
    }

    /// Cruise to `cruise_until`, then shrink the remaining distance to `left`
    fn shrink_mid_cruise(left: i32) -> (MotionController<RecordingCoils>, u64) {
        let mut ctrl = controller();
        ctrl.enqueue_relative(4000).unwrap();
        let mut now = 0;
        while ctrl.position() < 1500 {
            ctrl.advance(now);
            now += 100;
        }
        assert!(ctrl.speed > 900.0, "not cruising yet");
        ctrl.enqueue_relative(left - ctrl.distance_to_go()).unwrap();
        assert_eq!(ctrl.distance_to_go(), left);
        (ctrl, now)
    }

    /// Run to idle, returning (speed of the final step, furthest position)
    fn finish(ctrl: &mut MotionController<RecordingCoils>, mut now: u64) -> (f32, i32) {
        let mut last_step_speed = ctrl.speed;
        let mut furthest = ctrl.position();
        loop {
            let before = (ctrl.position(), ctrl.speed);
            let moving = ctrl.advance(now);
            if ctrl.position() != before.0 {
                last_step_speed = before.1;
                furthest = furthest.max(ctrl.position());
            }
            if !moving {
                return (last_step_speed, furthest);
            }
            now += 100;
        }
    }

    #[test]
    fn test_shrunk_target_overshoots_instead_of_hard_stop() {
        let (mut ctrl, now) = shrink_mid_cruise(5);
        let target = ctrl.target();

        let (arrival_speed, furthest) = finish(&mut ctrl, now);
        assert!(
            arrival_speed <= max_arrival_speed(&ctrl),
            "stopped from {} steps/s",
            arrival_speed
        );
        assert!(furthest > target);
        assert_eq!(ctrl.position(), target);
        assert!(ctrl.is_idle());
        assert!(!ctrl.is_energized());
    }

    #[test]
    fn test_cancel_mid_cruise_brakes_and_returns() {
        let (mut ctrl, now) = shrink_mid_cruise(0);
        let target = ctrl.target();
        assert!(!ctrl.is_idle());

        let (arrival_speed, furthest) = finish(&mut ctrl, now);
        assert!(arrival_speed <= max_arrival_speed(&ctrl));
        assert!(furthest > target);
        assert_eq!(ctrl.position(), target);
        assert!(ctrl.is_idle());
    }

    #[test]
    fn test_normal_arrival_is_at_creep_speed() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(3000).unwrap();
        let (arrival_speed, furthest) = finish(&mut ctrl, 0);
        assert!(arrival_speed <= max_arrival_speed(&ctrl));
        assert_eq!(furthest, 3000);
        assert_eq!(ctrl.position(), 3000);
    }

    #[test]
    fn test_cancelled_request_releases() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(10).unwrap();
        ctrl.enqueue_relative(-10).unwrap();
        assert!(!ctrl.advance(0));
        assert!(!ctrl.is_energized());
    }

    #[test]
    fn test_step_waits_for_interval() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(100).unwrap();
        ctrl.advance(0);
        assert_eq!(ctrl.position(), 1);

        // Creep interval at 500 steps/s^2 is ~31ms
        ctrl.advance(1_000);
        assert_eq!(ctrl.position(), 1);
        ctrl.advance(40_000);
        assert_eq!(ctrl.position(), 2);
    }

    #[test]
    fn test_negative_positions_wrap_phase() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(-3).unwrap();
        run_to_idle(&mut ctrl, 0);
        assert_eq!(ctrl.position(), -3);
        // -3 mod 8 == 5, applied on the last step before release
        assert_eq!(ctrl.phase(), 5);
    }

    #[test]
    fn test_accelerates_then_decelerates() {
        let mut ctrl = controller();
        ctrl.enqueue_relative(4000).unwrap();
        let mut now = 0;
        let mut seen_accel = false;
        let mut seen_decel_after_accel = false;
        while ctrl.advance(now) {
            match ctrl.state() {
                MotionState::Accelerating => seen_accel = true,
                MotionState::Decelerating if seen_accel => seen_decel_after_accel = true,
                _ => {}
            }
            now += 100;
        }
        assert!(seen_accel);
        assert!(seen_decel_after_accel);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_no_step_loss_no_overshoot(delta in -8192i32..=8192) {
            let mut ctrl = controller();
            ctrl.enqueue_relative(delta).unwrap();
            let mut now = 0u64;
            while ctrl.advance(now) {
                let pos = ctrl.position();
                if delta >= 0 {
                    prop_assert!(pos >= 0 && pos <= delta);
                } else {
                    prop_assert!(pos <= 0 && pos >= delta);
                }
                now += 250;
            }
            prop_assert_eq!(ctrl.position(), delta);
            prop_assert!(!ctrl.is_energized());
        }

        #[test]
        fn prop_oversized_moves_change_nothing(delta in 8193i32..i32::MAX, negative in any::<bool>()) {
            let mut ctrl = controller();
            let delta = if negative { -delta } else { delta };
            prop_assert!(ctrl.enqueue_relative(delta).is_err());
            prop_assert_eq!(ctrl.target(), 0);
            prop_assert_eq!(ctrl.position(), 0);
        }
    }
}
