//! Control loop task
//!
//! The single consumer of commands. Each iteration reads the clock once,
//! applies at most one pending request, then runs one apparatus tick
//! (display refresh, one motor micro-step or one sensor poll) and yields
//! so the network tasks get serviced.

use core::fmt::Write;

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Delay, Instant};
use heapless::String;

use quizbox_core::display::IDLE_QUESTION;
use quizbox_core::scheduler::{Apparatus, TickReport};
use quizbox_drivers::display::Lcd1602;
use quizbox_drivers::sensor::LdrSensor;
use quizbox_drivers::stepper::Uln2003;

use crate::channels::{NetworkStatus, COMMANDS, NETWORK_STATUS, REPLIES};

/// Pointer coils (GP10-GP13)
pub type Coils = Uln2003<Output<'static>>;

/// Vote sensor input
pub type Sensor = LdrSensor<Input<'static>>;

/// 16x2 LCD on I2C0
pub type Lcd = Lcd1602<I2c<'static, I2C0, Blocking>, Delay>;

/// Control task - owns the apparatus and runs the cooperative loop
#[embassy_executor::task]
pub async fn control_task(
    mut apparatus: Apparatus<Coils>,
    mut sensor_a: Sensor,
    mut sensor_b: Sensor,
    mut lcd: Lcd,
) -> ! {
    info!("Control task started");

    if let Err(e) = lcd.init() {
        warn!("LCD init failed: {:?}", e);
    }

    loop {
        let now = Instant::now();
        let now_ms = now.as_millis();

        if let Some(status) = NETWORK_STATUS.try_take() {
            show_network_status(&mut apparatus, status, now_ms);
        }

        if let Ok(command) = COMMANDS.try_receive() {
            debug!("Command: {}", command);
            let reply = apparatus.execute(&command, now_ms);
            debug!("Reply: {} ({} bytes)", reply.status, reply.body.len());
            REPLIES.signal(reply);
        }

        // Blocks ~4 ms on ticks that redraw the LCD
        let report = apparatus.tick(now.as_micros(), &mut sensor_a, &mut sensor_b, &mut lcd);
        log_report(&apparatus, &report);

        yield_now().await;
    }
}

/// Put the outcome of Wi-Fi bring-up on the display
fn show_network_status(apparatus: &mut Apparatus<Coils>, status: NetworkStatus, now_ms: u64) {
    let mut text: String<48> = String::new();
    match status {
        NetworkStatus::Connected([a, b, c, d]) => {
            let _ = write!(text, "{} at {}.{}.{}.{}", IDLE_QUESTION, a, b, c, d);
        }
        NetworkStatus::Failed => {
            let _ = text.push_str("Wi-Fi failed, offline");
        }
        NetworkStatus::Disabled => {
            let _ = text.push_str("Wi-Fi disabled");
        }
    }
    apparatus.show_notice(&text, now_ms);
}

fn log_report(apparatus: &Apparatus<Coils>, report: &TickReport) {
    if let Some(e) = report.display_error {
        warn!("LCD refresh failed: {:?}", e);
    }
    if let Some(page) = report.page_swap {
        trace!("Page: {}", page);
    }
    if let Some(side) = report.vote {
        let pending = apparatus.tally().pending();
        info!("Vote {} (pending A={} B={})", side, pending.a, pending.b);
    }
    if let Some(e) = report.feedback_error {
        warn!("Vote feedback move rejected: {:?}", e);
    }
    if report.arrived {
        info!("Pointer at {}", apparatus.motion().position());
    }
}
