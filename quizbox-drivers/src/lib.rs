//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in quizbox-core, generic over the `embedded-hal` 1.0 traits:
//!
//! - Stepper coil driver (ULN2003 Darlington array, half-step)
//! - Character display (HD44780 16x2 behind a PCF8574 I2C backpack)
//! - Light sensors (LDR comparator modules)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod sensor;
pub mod stepper;
