//! Stepper coil driver trait
//!
//! The apparatus uses a unipolar stepper (28BYJ-48) switched directly
//! through a Darlington array, so there is no step/dir driver chip: the
//! firmware selects which coils are energized for each micro-step.

/// Number of distinct coil patterns in half-step drive mode
pub const HALF_STEP_PHASES: u8 = 8;

/// Trait for coil-level stepper drivers
///
/// `phase` is always in `0..HALF_STEP_PHASES`. Consecutive phases move the
/// rotor by one micro-step; walking the phases backwards reverses it.
pub trait CoilDriver {
    /// Energize the coil pattern for the given half-step phase
    fn apply(&mut self, phase: u8);

    /// De-energize all coils
    ///
    /// The rotor is free to turn afterwards; the motor draws no current.
    fn release(&mut self);
}
