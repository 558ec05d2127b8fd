//! Quizbox - Quiz/Voting Apparatus Firmware
//!
//! Main firmware binary for the Raspberry Pi Pico W. A stepper-driven
//! pointer, two light-sensor voting buttons and a 16x2 LCD, controlled
//! over HTTP by the quiz bot.
//!
//! Pin assignments:
//! - GP10-GP13: ULN2003 IN1-IN4 (28BYJ-48)
//! - GP14 / GP15: sensor A / sensor B (LDR comparator outputs)
//! - GP16 / GP17: I2C0 SDA / SCL (PCF8574 LCD backpack)
//! - GP23, GP24, GP25, GP29: CYW43439 (on-board)

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{SpawnError, SpawnToken, Spawner};
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level as PinLevel, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_time::{Delay, Instant};
use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use quizbox_core::scheduler::Apparatus;
use quizbox_drivers::display::Lcd1602;
use quizbox_drivers::sensor::LdrSensor;
use quizbox_drivers::stepper::Uln2003;

use crate::channels::{NetworkStatus, NETWORK_STATUS};

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

/// LCD bus speed; one full redraw is ~4 ms at this rate
const I2C_FREQUENCY_HZ: u32 = 400_000;

/// Mixed with the boot timer to seed the network stack
const NET_SEED_SALT: u64 = 0x5155_495a_424f_5821;

// Static cells for network state (must live forever)
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Quizbox firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Pointer stepper
    let coils = Uln2003::new([
        Output::new(p.PIN_10, PinLevel::Low),
        Output::new(p.PIN_11, PinLevel::Low),
        Output::new(p.PIN_12, PinLevel::Low),
        Output::new(p.PIN_13, PinLevel::Low),
    ]);

    // Vote sensors (comparator outputs drive the pins)
    let sensor_a = LdrSensor::new(Input::new(p.PIN_14, Pull::None));
    let sensor_b = LdrSensor::new(Input::new(p.PIN_15, Pull::None));

    // Character LCD
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);
    let lcd = Lcd1602::new(i2c, Delay, config.display.i2c_address);
    info!("Stepper, sensors and LCD configured");

    let apparatus = Apparatus::new(coils, &config);
    spawn(
        &spawner,
        "control",
        tasks::control_task(apparatus, sensor_a, sensor_b, lcd),
    );

    if !config.has_network() {
        warn!("No SSID configured, networking disabled");
        NETWORK_STATUS.signal(NetworkStatus::Disabled);
        return;
    }

    // CYW43439 radio over PIO gSPI
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, PinLevel::Low);
    let cs = Output::new(p.PIN_25, PinLevel::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    spawn(&spawner, "cyw43", tasks::cyw43_task(runner));

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;
    info!("CYW43439 initialized");

    let seed = NET_SEED_SALT ^ Instant::now().as_ticks();
    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawn(&spawner, "net", tasks::net_task(runner));

    match tasks::join_network(&mut control, stack, &config.network).await {
        Some(address) => {
            NETWORK_STATUS.signal(NetworkStatus::Connected(address));
            spawn(
                &spawner,
                "http",
                tasks::http_server_task(stack, config.network.http_port),
            );
            info!("All tasks spawned, firmware running");
        }
        None => {
            error!(
                "Could not join '{}', continuing offline",
                config.network.ssid.as_str()
            );
            NETWORK_STATUS.signal(NetworkStatus::Failed);
        }
    }

    // The radio control handle and PIO block stay owned here
    core::future::pending::<()>().await;
}

/// Spawn a task, logging instead of panicking if its pool is exhausted
fn spawn<S>(spawner: &Spawner, name: &str, token: Result<SpawnToken<S>, SpawnError>) {
    match token {
        Ok(token) => {
            spawner.spawn(token);
            debug!("Spawned {} task", name);
        }
        Err(e) => error!("Failed to spawn {} task: {:?}", name, e),
    }
}
