//! Configuration types and parsing
//!
//! Settings come from a TOML file embedded in the firmware image and are
//! parsed by a small no_std parser.

pub mod toml;
pub mod types;

pub use toml::{parse_config, ParseError};
pub use types::*;
