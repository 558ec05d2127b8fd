//! Light sensor drivers

pub mod ldr;

pub use ldr::LdrSensor;
