//! LDR comparator module
//!
//! The module's digital output (DO) is a comparator against a trim pot,
//! so the firmware only ever samples a GPIO. Which level means "covered"
//! is a configuration matter handled by the vote monitor.

use embedded_hal::digital::InputPin;
use quizbox_core::traits::{Level, LightSensor};

/// Digital LDR sensor on one input pin
pub struct LdrSensor<P> {
    pin: P,
    /// Returned when a read fails
    last: Level,
}

impl<P: InputPin> LdrSensor<P> {
    /// Wrap an input pin
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            last: Level::Low,
        }
    }
}

impl<P: InputPin> LightSensor for LdrSensor<P> {
    fn level(&mut self) -> Level {
        if let Ok(high) = self.pin.is_high() {
            self.last = Level::from_high(high);
        }
        self.last
    }
}
