//! ULN2003 unipolar stepper driver
//!
//! The 28BYJ-48 is switched coil by coil through the Darlington array on
//! four GPIOs (IN1-IN4). Half-step drive alternates one and two energized
//! coils, giving 8 phases per electrical cycle and 4096 micro-steps per
//! output shaft revolution.
//!
//! # Usage
//!
//! ```ignore
//! let coils = Uln2003::new([in1, in2, in3, in4]);
//! let mut motion = MotionController::new(coils, profile, 8192);
//! ```

use embedded_hal::digital::{OutputPin, PinState};
use quizbox_core::traits::{CoilDriver, HALF_STEP_PHASES};

/// Coil pattern per half-step phase, IN1..IN4
pub const HALF_STEP_TABLE: [[bool; 4]; HALF_STEP_PHASES as usize] = [
    [true, false, false, false],
    [true, true, false, false],
    [false, true, false, false],
    [false, true, true, false],
    [false, false, true, false],
    [false, false, true, true],
    [false, false, false, true],
    [true, false, false, true],
];

/// Four-input ULN2003 coil driver
pub struct Uln2003<P> {
    /// IN1..IN4
    pins: [P; 4],
}

impl<P: OutputPin> Uln2003<P> {
    /// Create a driver with all coils off
    pub fn new(pins: [P; 4]) -> Self {
        let mut driver = Self { pins };
        driver.release();
        driver
    }

    /// Give the pins back
    pub fn free(self) -> [P; 4] {
        self.pins
    }

    fn write(&mut self, pattern: [bool; 4]) {
        for (pin, on) in self.pins.iter_mut().zip(pattern) {
            // GPIO writes on the target cannot fail
            let _ = pin.set_state(PinState::from(on));
        }
    }
}

impl<P: OutputPin> CoilDriver for Uln2003<P> {
    fn apply(&mut self, phase: u8) {
        let pattern = HALF_STEP_TABLE[usize::from(phase % HALF_STEP_PHASES)];
        self.write(pattern);
    }

    fn release(&mut self) {
        self.write([false; 4]);
    }
}
