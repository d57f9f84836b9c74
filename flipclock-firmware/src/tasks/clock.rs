//! Clock refresh loop
//!
//! Resyncs the RTC on the profile's interval and flips the face when the
//! hour or minute changes. Runs until the stop button is pressed.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::RTC;
use embassy_time::{Delay, Instant, Timer};

use flipclock_core::refresh::{ClockSession, DisplayUpdate, TickReport, TICK_INTERVAL_MS};
use flipclock_core::sync::{SyncOutcome, TimeSource};
use flipclock_hal::WifiLink;
use flipclock_hal_rp2040::{CywLink, Rp2040Rtc};

use crate::channels::STOP;
use crate::display::Face;
use crate::profile::{self, Fetcher};

/// Everything the refresh loop owns
pub struct ClockContext {
    pub session: ClockSession<Face>,
    pub source: TimeSource,
    pub fetcher: Fetcher,
    pub rtc: Rp2040Rtc<'static, RTC>,
    pub link: CywLink<'static>,
}

#[embassy_executor::task]
pub async fn clock_task(mut ctx: ClockContext) {
    info!(
        "Clock task started ({}, resync every {} s)",
        profile::NAME,
        profile::SYNC_INTERVAL_MS / 1000
    );

    let mut delay = Delay;
    loop {
        let now_ms = Instant::now().as_millis();
        let link_up = ctx.link.is_connected();

        let report = match ctx
            .session
            .tick(
                now_ms,
                link_up,
                &mut ctx.source,
                &mut ctx.fetcher,
                &mut ctx.rtc,
                &mut delay,
            )
            .await
        {
            Ok(report) => report,
            Err(e) => defmt::panic!("Clock face failed: {}", e),
        };
        log_report(&report, &ctx.fetcher);

        match select(Timer::after_millis(TICK_INTERVAL_MS), STOP.wait()).await {
            Either::First(()) => {}
            Either::Second(()) => break,
        }
    }

    info!("Clock loop stopped");
}

fn log_report(report: &TickReport, fetcher: &Fetcher) {
    match report.sync {
        None => {}
        Some(SyncOutcome::Synced { time, attempts }) => {
            info!("Clock set to {} ({} attempts)", time, attempts)
        }
        Some(SyncOutcome::FellBack {
            cause,
            time,
            programmed_epoch,
        }) => {
            if programmed_epoch {
                warn!("Network unavailable ({}), clock set to {}", cause, time);
            } else {
                warn!("Network unavailable ({}), clock left at {}", cause, time);
            }
        }
        Some(SyncOutcome::Rejected(e)) => log_rejected(e, fetcher),
        Some(SyncOutcome::ClockFault(e)) => error!("Clock could not be set: {}", e),
    }

    match report.display {
        DisplayUpdate::Unchanged => {}
        DisplayUpdate::Written { first, second } => {
            debug!("Showing {}:{}", first.as_str(), second.as_str())
        }
        DisplayUpdate::ClockUnreadable(e) => warn!("Clock unreadable: {}", e),
    }
}

#[cfg(feature = "time-service")]
fn log_rejected(e: flipclock_core::sync::FetchError, fetcher: &Fetcher) {
    warn!("Time service reply rejected: {}", e);
    warn!("  body: {}", fetcher.last_body());
}

#[cfg(feature = "ntp")]
fn log_rejected(e: flipclock_core::sync::FetchError, _fetcher: &Fetcher) {
    warn!("NTP reply rejected: {}", e);
}
