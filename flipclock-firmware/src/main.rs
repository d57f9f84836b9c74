//! Flipclock firmware
//!
//! Main entry point for the Pico W flip clock. Initializes hardware, joins
//! the wireless network, then hands the panel, RTC and time source to the
//! clock task.

#![no_std]
#![no_main]

mod channels;
mod config;
mod display;
mod profile;
mod tasks;

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::{Config, StackResources};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::rtc::{InterruptHandler as RtcInterruptHandler, Rtc};
use embassy_time::{Delay, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use flipclock_core::config::Settings;
use flipclock_core::net::{connect, Backoff};
use flipclock_core::refresh::ClockSession;
use flipclock_core::sync::{TimeSource, TimezonePolicy};
use flipclock_hal_rp2040::{CywLink, Rp2040Rtc};

use display::PanelPins;
use tasks::ClockContext;

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    RTC_IRQ => RtcInterruptHandler;
});

/// Sockets: DHCP, DNS and one TCP or UDP socket at a time, plus slack
const SOCKET_COUNT: usize = 4;

static SETTINGS: StaticCell<Settings> = StaticCell::new();
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Flipclock firmware starting...");

    let p = embassy_rp::init(Default::default());
    let mut rng = RoscRng;

    let settings: &'static Settings = SETTINGS.init(config::load_settings(p.FLASH, p.DMA_CH1).await);

    // Panel first so a blank screen means the firmware never started
    let panel = display::init_panel(PanelPins {
        spi: p.SPI0,
        clk: p.PIN_18,
        mosi: p.PIN_19,
        cs: p.PIN_17,
        dc: p.PIN_20,
        rst: p.PIN_21,
        backlight: p.PIN_22,
    });
    let face = display::build_face(panel);

    // CYW43 radio on PIO0:
    // - PIN_23: power
    // - PIN_24: SPI data
    // - PIN_25: SPI chip select
    // - PIN_29: SPI clock
    let fw = include_bytes!("../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
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
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let seed = rng.next_u64();
    let (stack, runner) = embassy_net::new(
        net_device,
        Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(tasks::net_task(runner)).unwrap();

    spawner
        .spawn(tasks::stop_button_task(Input::new(p.PIN_15, Pull::Up)))
        .unwrap();

    // Join the network; on failure keep going so the clock still runs
    let mut link = CywLink::new(control, stack);
    info!("Joining \"{}\"...", settings.ssid.as_str());
    let joined = connect(
        &mut link,
        &settings.ssid,
        &settings.password,
        &Backoff::default(),
        &mut Delay,
        |failure| match failure.retry_in_ms {
            Some(ms) => warn!(
                "Join attempt {} failed: {}, retrying in {} ms",
                failure.attempt, failure.error, ms
            ),
            None => warn!("Join attempt {} failed: {}", failure.attempt, failure.error),
        },
    )
    .await;
    match joined {
        Ok(attempts) => {
            if let Some(config) = stack.config_v4() {
                info!("Joined after {} attempts, address {}", attempts, config.address);
            }
        }
        Err(e) => error!("Could not join the network ({}), running offline", e),
    }

    let rtc = Rp2040Rtc::new(Rtc::new(p.RTC, Irqs));
    let source = TimeSource::new(TimezonePolicy::from_settings(settings));
    let fetcher = profile::fetcher(stack, settings);
    let session = ClockSession::new(face, profile::SYNC_INTERVAL_MS);

    spawner
        .spawn(tasks::clock_task(ClockContext {
            session,
            source,
            fetcher,
            rtc,
            link,
        }))
        .unwrap();

    info!("All tasks spawned");

    // Idle heartbeat
    loop {
        Timer::after_secs(60).await;
        debug!("Heartbeat");
    }
}
