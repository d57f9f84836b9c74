//! Time source
//!
//! Owns the cached last-known time and keeps the hardware clock loosely in
//! step with the network. A resync never fails outright: every path ends
//! in a [`SyncOutcome`] for the caller to log.

use embedded_hal_async::delay::DelayNs;

use flipclock_hal::{RealTimeClock, RtcError, RtcTime};

use super::fetch::{FetchError, TimeFetch};
use super::policy::TimezonePolicy;
use crate::time::DateTime;

/// Pause between programming the clock and reading it back (ms)
pub const RTC_SETTLE_MS: u32 = 500;

/// Why a resync fell back instead of using network time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FallbackCause {
    /// Network link was down
    LinkDown,
    /// Request failed at the transport level
    Fetch(FetchError),
}

/// Result of a resync
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncOutcome {
    /// Clock programmed from network time; `time` is the read-back value
    Synced { time: DateTime, attempts: u8 },
    /// Network unavailable
    ///
    /// With a previous time the clock is left running untouched; without
    /// one it is programmed with the fallback epoch (`programmed_epoch`).
    FellBack {
        cause: FallbackCause,
        time: DateTime,
        programmed_epoch: bool,
    },
    /// Response malformed or error-flagged; nothing changed
    Rejected(FetchError),
    /// The clock could not be programmed or read back
    ClockFault(RtcError),
}

/// Network time source with fallback
#[derive(Debug, Clone)]
pub struct TimeSource {
    policy: TimezonePolicy,
    last_known: Option<DateTime>,
}

impl TimeSource {
    pub fn new(policy: TimezonePolicy) -> Self {
        Self {
            policy,
            last_known: None,
        }
    }

    /// Most recent time obtained from the network or the clock
    pub fn last_known(&self) -> Option<DateTime> {
        self.last_known
    }

    pub fn policy(&self) -> TimezonePolicy {
        self.policy
    }

    /// Record a time read from the clock
    pub fn observe(&mut self, time: DateTime) {
        self.last_known = Some(time);
    }

    /// Fetch network time and program the clock
    ///
    /// # Arguments
    /// * `link_up` - Whether the network is connected; when not, no request
    ///   is made and the fallback applies
    /// * `fetcher` - Network time source
    /// * `rtc` - Hardware clock to program
    /// * `delay` - Used for retry pauses and the read-back settle
    pub async fn resync<F, R, D>(
        &mut self,
        link_up: bool,
        fetcher: &mut F,
        rtc: &mut R,
        delay: &mut D,
    ) -> SyncOutcome
    where
        F: TimeFetch,
        R: RealTimeClock,
        D: DelayNs,
    {
        if !link_up {
            return self.fall_back(FallbackCause::LinkDown, rtc, delay).await;
        }

        let fetched = match fetcher.fetch(delay).await {
            Ok(fetched) => fetched,
            Err(e) if e.is_transport() => {
                return self.fall_back(FallbackCause::Fetch(e), rtc, delay).await;
            }
            Err(e) => return SyncOutcome::Rejected(e),
        };

        let local = match self.policy.resolve(fetched.wall, fetched.utc_offset) {
            Ok(local) => local,
            Err(e) => return SyncOutcome::Rejected(FetchError::Time(e)),
        };

        match self.program(local, rtc, delay).await {
            Ok(time) => SyncOutcome::Synced {
                time,
                attempts: fetched.attempts,
            },
            Err(e) => SyncOutcome::ClockFault(e),
        }
    }

    async fn fall_back<R, D>(&mut self, cause: FallbackCause, rtc: &mut R, delay: &mut D) -> SyncOutcome
    where
        R: RealTimeClock,
        D: DelayNs,
    {
        if let Some(time) = self.last_known {
            return SyncOutcome::FellBack {
                cause,
                time,
                programmed_epoch: false,
            };
        }

        match self.program(DateTime::fallback_epoch(), rtc, delay).await {
            Ok(time) => SyncOutcome::FellBack {
                cause,
                time,
                programmed_epoch: true,
            },
            Err(e) => SyncOutcome::ClockFault(e),
        }
    }

    /// Program the clock, let it settle, and cache the read-back value
    async fn program<R, D>(&mut self, time: DateTime, rtc: &mut R, delay: &mut D) -> Result<DateTime, RtcError>
    where
        R: RealTimeClock,
        D: DelayNs,
    {
        rtc.set(&RtcTime::from(time))?;
        delay.delay_ms(RTC_SETTLE_MS).await;
        let readback = DateTime::try_from(rtc.now()?).map_err(|_| RtcError::InvalidTime)?;
        self.last_known = Some(readback);
        Ok(readback)
    }
}
