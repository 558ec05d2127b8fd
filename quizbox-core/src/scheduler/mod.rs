//! Cooperative apparatus scheduler
//!
//! Aggregates the motion controller, vote monitor, tally and presenter,
//! and defines the fixed per-iteration order the control loop runs them in.

pub mod apparatus;

pub use apparatus::{Apparatus, TickReport};
