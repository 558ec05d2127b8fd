//! Embassy async tasks
//!
//! The control loop owns the apparatus; the network tasks only move bytes
//! and talk to it through the channels in [`crate::channels`].

pub mod control;
pub mod http;
pub mod network;

pub use control::{control_task, Coils, Lcd, Sensor};
pub use http::http_server_task;
pub use network::{cyw43_task, join_network, net_task, Cyw43Spi};
