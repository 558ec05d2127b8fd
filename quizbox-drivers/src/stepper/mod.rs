//! Stepper coil drivers

pub mod uln2003;

pub use uln2003::{Uln2003, HALF_STEP_TABLE};
