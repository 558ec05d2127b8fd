//! Wi-Fi bring-up and network runner tasks
//!
//! The CYW43439 and the embassy-net stack each need a background runner.
//! Joining happens once at boot with a bounded number of attempts.

use defmt::*;
use embassy_net::Stack;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_time::{with_timeout, Duration, Timer};
use cyw43::JoinOptions;
use cyw43_pio::PioSpi;

use quizbox_core::config::NetworkConfig;

/// Delay between join attempts
const JOIN_RETRY_DELAY: Duration = Duration::from_secs(2);

/// How long to wait for a DHCP lease after joining
const DHCP_TIMEOUT: Duration = Duration::from_secs(30);

/// PIO-driven gSPI bus to the radio
pub type Cyw43Spi = PioSpi<'static, PIO0, 0, DMA_CH0>;

/// Radio runner task - services the CYW43439 bus forever
#[embassy_executor::task]
pub async fn cyw43_task(runner: cyw43::Runner<'static, Output<'static>, Cyw43Spi>) -> ! {
    runner.run().await
}

/// Network stack runner task
#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Join the configured network and wait for an IPv4 address
///
/// Returns the address on success, or `None` once every attempt failed.
pub async fn join_network(
    control: &mut cyw43::Control<'static>,
    stack: Stack<'static>,
    config: &NetworkConfig,
) -> Option<[u8; 4]> {
    let ssid = config.ssid.as_str();
    let attempts = config.join_attempts.max(1);

    let mut joined = false;
    for attempt in 1..=attempts {
        info!("Joining '{}' (attempt {}/{})", ssid, attempt, attempts);
        let options = if config.password.is_empty() {
            JoinOptions::new_open()
        } else {
            JoinOptions::new(config.password.as_bytes())
        };
        match control.join(ssid, options).await {
            Ok(()) => {
                joined = true;
                break;
            }
            Err(e) => {
                warn!("Join failed with status={}", e.status);
                if attempt < attempts {
                    Timer::after(JOIN_RETRY_DELAY).await;
                }
            }
        }
    }
    if !joined {
        return None;
    }

    stack.wait_link_up().await;
    if with_timeout(DHCP_TIMEOUT, stack.wait_config_up()).await.is_err() {
        warn!("No DHCP lease after {} s", DHCP_TIMEOUT.as_secs());
        return None;
    }

    let address = stack.config_v4()?.address.address().octets();
    info!(
        "Network up: {}.{}.{}.{}",
        address[0], address[1], address[2], address[3]
    );
    Some(address)
}
