//! Character display drivers

pub mod hd44780;

pub use hd44780::{Lcd1602, DEFAULT_ADDRESS};
