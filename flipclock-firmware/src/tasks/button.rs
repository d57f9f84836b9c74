//! Stop button
//!
//! A press on the active-low button asks the clock loop to exit.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use crate::channels::STOP;

/// Contact bounce settle time
const DEBOUNCE_MS: u64 = 50;

#[embassy_executor::task]
pub async fn stop_button_task(mut button: Input<'static>) {
    info!("Stop button task started");

    loop {
        button.wait_for_falling_edge().await;
        Timer::after_millis(DEBOUNCE_MS).await;
        if button.is_low() {
            break;
        }
    }

    info!("Stop requested");
    STOP.signal(());
}
