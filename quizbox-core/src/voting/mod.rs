//! Vote sensing
//!
//! Edge-detects "covered" transitions on the two light sensors and keeps
//! the pending vote counts until the bot drains them.

pub mod monitor;
pub mod tally;

pub use monitor::{Side, VoteMonitor, DEFAULT_COOLDOWN_MS};
pub use tally::{VoteCounts, VoteTally};
