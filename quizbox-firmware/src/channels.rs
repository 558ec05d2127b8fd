//! Inter-task communication channels
//!
//! The HTTP task hands one request at a time to the control loop and waits
//! for its reply. The control loop owns all apparatus state, so these are
//! the only shared objects.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use quizbox_core::command::{Command, Reply};

/// Requests waiting for the control loop
///
/// A single slot: the HTTP server handles one connection at a time and
/// blocks on the reply before accepting the next.
pub static COMMANDS: Channel<CriticalSectionRawMutex, Command, 1> = Channel::new();

/// Reply to the most recent command (set by the control loop)
pub static REPLIES: Signal<CriticalSectionRawMutex, Reply> = Signal::new();

/// Outcome of Wi-Fi bring-up, shown on the LCD by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetworkStatus {
    /// Joined and configured; HTTP server is listening
    Connected([u8; 4]),
    /// Every join attempt failed
    Failed,
    /// No SSID configured
    Disabled,
}

/// Network status updates (set by main during bring-up)
pub static NETWORK_STATUS: Signal<CriticalSectionRawMutex, NetworkStatus> = Signal::new();
