//! Clock session
//!
//! Holds everything the refresh loop mutates between ticks: the face, the
//! last displayed values, the sync state and the resync schedule. The
//! firmware owns one session and calls [`ClockSession::tick`] at a fixed
//! period.

use embedded_hal_async::delay::DelayNs;

use flipclock_hal::{RealTimeClock, RtcError};

use super::machine::{SyncEvent, SyncState};
use super::schedule::ResyncSchedule;
use super::tracker::DisplayTracker;
use crate::sync::{SyncOutcome, TimeFetch, TimeSource};
use crate::time::{DateTime, DigitPair, FormatError};
use crate::traits::{ClockFace, FaceError};

/// Tick period of the refresh loop (ms)
pub const TICK_INTERVAL_MS: u64 = 750;

/// Pause after each pair write, letting the flip animation finish (ms)
pub const WRITE_SETTLE_MS: u32 = 1_000;

/// Fatal refresh loop errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionError {
    /// The face rejected a value or failed to draw
    Face(FaceError),
    /// A clock field could not be formatted as two digits
    Format(FormatError),
}

impl From<FaceError> for SessionError {
    fn from(e: FaceError) -> Self {
        SessionError::Face(e)
    }
}

impl From<FormatError> for SessionError {
    fn from(e: FormatError) -> Self {
        SessionError::Format(e)
    }
}

/// What a tick did to the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayUpdate {
    /// Hour and minute unchanged; no writes
    Unchanged,
    /// Both pairs rewritten
    Written { first: DigitPair, second: DigitPair },
    /// The clock could not be read this tick
    ClockUnreadable(RtcError),
}

/// Summary of one tick, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Present when a resync ran this tick
    pub sync: Option<SyncOutcome>,
    pub display: DisplayUpdate,
}

/// Refresh loop context
pub struct ClockSession<F> {
    face: F,
    tracker: DisplayTracker,
    state: SyncState,
    schedule: ResyncSchedule,
}

impl<F: ClockFace> ClockSession<F> {
    /// Create a session whose first tick resyncs
    pub fn new(face: F, sync_interval_ms: u64) -> Self {
        Self {
            face,
            tracker: DisplayTracker::new(),
            state: SyncState::Idle,
            schedule: ResyncSchedule::new(sync_interval_ms),
        }
    }

    pub fn face(&self) -> &F {
        &self.face
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn schedule(&self) -> &ResyncSchedule {
        &self.schedule
    }

    /// Resync now, regardless of the schedule
    pub async fn sync_now<T, R, D>(
        &mut self,
        now_ms: u64,
        link_up: bool,
        source: &mut TimeSource,
        fetcher: &mut T,
        rtc: &mut R,
        delay: &mut D,
    ) -> SyncOutcome
    where
        T: TimeFetch,
        R: RealTimeClock,
        D: DelayNs,
    {
        self.state = self.state.transition(SyncEvent::IntervalElapsed);
        let outcome = source.resync(link_up, fetcher, rtc, delay).await;
        self.state = self.state.transition(SyncEvent::SyncFinished);
        self.schedule.mark_synced(now_ms);
        outcome
    }

    /// Run one refresh tick
    ///
    /// Resyncs if the interval has elapsed, then reads the clock and
    /// updates the face if the hour or minute changed. Only face and
    /// formatting errors are returned; everything else is reported in the
    /// [`TickReport`].
    pub async fn tick<T, R, D>(
        &mut self,
        now_ms: u64,
        link_up: bool,
        source: &mut TimeSource,
        fetcher: &mut T,
        rtc: &mut R,
        delay: &mut D,
    ) -> Result<TickReport, SessionError>
    where
        T: TimeFetch,
        R: RealTimeClock,
        D: DelayNs,
    {
        let sync = if self.schedule.is_due(now_ms) {
            Some(
                self.sync_now(now_ms, link_up, source, fetcher, rtc, delay)
                    .await,
            )
        } else {
            None
        };

        let reading = rtc
            .now()
            .and_then(|raw| DateTime::try_from(raw).map_err(|_| RtcError::InvalidTime));
        let now = match reading {
            Ok(now) => now,
            Err(e) => {
                return Ok(TickReport {
                    sync,
                    display: DisplayUpdate::ClockUnreadable(e),
                })
            }
        };
        source.observe(now);

        let display = self.show(now.hour, now.minute, delay).await?;
        Ok(TickReport { sync, display })
    }

    /// Push `hour` and `minute` to the face if either changed
    ///
    /// The hour is written and settled before the minute.
    pub async fn show<D: DelayNs>(
        &mut self,
        hour: u8,
        minute: u8,
        delay: &mut D,
    ) -> Result<DisplayUpdate, SessionError> {
        if !self.tracker.differs(hour, minute) {
            return Ok(DisplayUpdate::Unchanged);
        }

        let first = DigitPair::new(hour)?;
        let second = DigitPair::new(minute)?;

        self.face.set_first_pair(first.as_str()).await?;
        delay.delay_ms(WRITE_SETTLE_MS).await;
        self.face.set_second_pair(second.as_str()).await?;
        delay.delay_ms(WRITE_SETTLE_MS).await;

        self.tracker.commit(hour, minute);
        Ok(DisplayUpdate::Written { first, second })
    }
}
