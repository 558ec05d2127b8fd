//! Configuration loading
//!
//! The configuration is compiled in from `quizbox.toml` and parsed at boot
//! by the no_std parser in `quizbox-core`.

pub mod loader;

pub use loader::load_config;
