//! Trapezoidal speed profile
//!
//! Computes the speed after each micro-step so that the motor accelerates
//! toward its maximum speed and brakes early enough to stop on target.
//! Per step, speed changes follow `v'^2 = v^2 +/- 2a`, which is constant
//! acceleration expressed in the step domain.

/// Microseconds per second
const US_PER_S: f32 = 1_000_000.0;

/// Braking to below this multiple of the creep speed squared halts outright
///
/// A planned approach arrives just under `2 * min_speed^2` before rounding;
/// the margin keeps accumulated `f32` error from turning that into a
/// one-step overshoot.
const STOP_MARGIN: f32 = 2.0;

/// Speed/acceleration limits for one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// Maximum speed in steps per second
    max_speed: f32,
    /// Acceleration in steps per second squared
    acceleration: f32,
    /// Speed reached one step after standstill; also the creep floor
    min_speed: f32,
}

impl SpeedProfile {
    /// Create a profile
    ///
    /// Zero values are raised to 1 so the profile always makes progress.
    pub fn new(max_speed: u32, acceleration: u32) -> Self {
        let max_speed = max_speed.max(1) as f32;
        let acceleration = acceleration.max(1) as f32;
        let min_speed = libm::sqrtf(2.0 * acceleration).min(max_speed);
        Self {
            max_speed,
            acceleration,
            min_speed,
        }
    }

    /// Maximum speed in steps per second
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Acceleration in steps per second squared
    pub fn acceleration(&self) -> f32 {
        self.acceleration
    }

    /// Lowest non-zero speed the profile produces
    pub fn min_speed(&self) -> f32 {
        self.min_speed
    }

    /// Steps needed to brake from `speed` to standstill
    pub fn stopping_steps(&self, speed: f32) -> f32 {
        speed * speed / (2.0 * self.acceleration)
    }

    /// Speed to use for the step after the one just taken
    ///
    /// With the target ahead but closer than the stopping distance, this
    /// still only brakes at `acceleration`; the controller then runs past
    /// the target and reverses.
    ///
    /// # Arguments
    /// - `speed`: Speed the last step was taken at (steps/s, >= 0)
    /// - `ahead`: Steps still to go in the current travel direction. Zero
    ///   or negative means the target is at or behind the rotor and the
    ///   motor must brake before it can reverse.
    ///
    /// # Returns
    /// The new speed. `0.0` means the motor has braked to a standstill.
    pub fn next_speed(&self, speed: f32, ahead: i32) -> f32 {
        let two_a = 2.0 * self.acceleration;

        if ahead <= 0 {
            let v2 = speed * speed - two_a;
            if v2 <= STOP_MARGIN * self.min_speed * self.min_speed {
                return 0.0;
            }
            return libm::sqrtf(v2);
        }

        if self.stopping_steps(speed) >= ahead as f32 {
            let v2 = speed * speed - two_a;
            if v2 <= 0.0 {
                return self.min_speed;
            }
            return libm::sqrtf(v2).max(self.min_speed);
        }

        libm::sqrtf(speed * speed + two_a).clamp(self.min_speed, self.max_speed)
    }

    /// Time between steps at a given speed
    ///
    /// A standstill speed maps to the creep interval, never to zero.
    pub fn interval_us(&self, speed: f32) -> u32 {
        let speed = if speed > 0.0 { speed } else { self.min_speed };
        (US_PER_S / speed) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_speed_capped_by_max() {
        let profile = SpeedProfile::new(10, 500);
        assert!(profile.min_speed() <= 10.0);
    }

    #[test]
    fn test_zero_limits_are_raised() {
        let profile = SpeedProfile::new(0, 0);
        assert!(profile.max_speed() >= 1.0);
        assert!(profile.acceleration() >= 1.0);
        assert!(profile.interval_us(0.0) > 0);
    }

    #[test]
    fn test_accelerates_until_max_speed() {
        let profile = SpeedProfile::new(1000, 500);
        let mut speed = 0.0;
        let mut previous = 0.0;
        for _ in 0..2000 {
            speed = profile.next_speed(speed, 100_000);
            assert!(speed >= previous);
            assert!(speed <= 1000.0);
            previous = speed;
        }
        assert!(speed > 990.0);
    }

    #[test]
    fn test_brakes_when_target_is_close() {
        let profile = SpeedProfile::new(1000, 500);
        let cruising = 1000.0;
        // 1000 steps are needed to stop from full speed
        let slower = profile.next_speed(cruising, 500);
        assert!(slower < cruising);
        let still_fast = profile.next_speed(cruising, 5000);
        assert!(still_fast >= cruising - 1.0);
    }

    #[test]
    fn test_braking_never_drops_below_creep_while_target_ahead() {
        let profile = SpeedProfile::new(1000, 500);
        let speed = profile.next_speed(profile.min_speed(), 1);
        assert!(speed >= profile.min_speed());
        assert!(speed > 0.0);
    }

    #[test]
    fn test_overshoot_brakes_to_standstill() {
        let profile = SpeedProfile::new(1000, 500);
        let mut speed = 400.0;
        let mut steps = 0;
        while speed > 0.0 {
            speed = profile.next_speed(speed, -10);
            steps += 1;
            assert!(steps < 1000, "never came to a stop");
        }
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn test_halts_only_near_creep() {
        let profile = SpeedProfile::new(1000, 500);
        // min^2 = 1000, so anything arriving at <= sqrt(3000) may halt
        assert_eq!(profile.next_speed(54.0, 0), 0.0);
        assert!(profile.next_speed(60.0, 0) > profile.min_speed());
        assert!(profile.next_speed(998.0, 0) > 990.0);
    }

    #[test]
    fn test_interval_shrinks_with_speed() {
        let profile = SpeedProfile::new(1000, 500);
        assert!(profile.interval_us(1000.0) < profile.interval_us(100.0));
        let at_max = profile.interval_us(1000.0);
        assert!((990..=1010).contains(&at_max));
    }
}
