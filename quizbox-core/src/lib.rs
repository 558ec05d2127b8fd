//! Board-agnostic core logic for the quiz/voting apparatus firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (coils, character display, light sensors)
//! - Non-blocking stepper motion control with trapezoidal speed profile
//! - Light-sensor vote detection and the pending vote tally
//! - Two-page marquee presenter for the 16x2 LCD
//! - HTTP request parsing, command model and reply encoding
//! - The cooperative apparatus scheduler tying it all together
//! - Configuration types and the TOML subset parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod display;
pub mod motion;
pub mod scheduler;
pub mod traits;
pub mod voting;
