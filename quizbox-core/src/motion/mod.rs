//! Motion control
//!
//! Non-blocking, one-micro-step-per-call positioning of the pointer
//! stepper with a trapezoidal speed profile.

pub mod controller;
pub mod profile;

pub use controller::{MotionController, MotionError, MotionState};
pub use profile::SpeedProfile;
