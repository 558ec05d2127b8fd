//! Light sensor trait
//!
//! Voting sensors are LDR modules with a comparator output, so all the
//! core ever sees is a binary level.

/// Digital input level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Convert from a pin reading
    pub fn from_high(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Trait for binary light sensors
pub trait LightSensor {
    /// Read the current output level
    fn level(&mut self) -> Level;
}
