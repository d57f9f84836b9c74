//! Real-time clock abstractions
//!
//! The hardware clock keeps local wall-clock time between network syncs.
//! Its interface is the classic nine-field calendar record.

/// DST flag value meaning "unknown"
pub const DST_UNKNOWN: i8 = -1;

/// Calendar record exchanged with the hardware clock
///
/// Field semantics follow the C `struct tm` convention the clock chips
/// use, except that `month` and `day` are 1-based and `year` is absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcTime {
    /// Full year (e.g. 2022)
    pub year: u16,
    /// Month (1-12)
    pub month: u8,
    /// Day of month (1-31)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
    /// Day of week, 0 = Monday ... 6 = Sunday
    pub weekday: u8,
    /// Day of year (1-366)
    pub yearday: u16,
    /// Daylight saving flag; always [`DST_UNKNOWN`] here
    pub isdst: i8,
}

/// Errors from real-time clock operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError {
    /// Clock has not been started or lost power
    NotRunning,
    /// The record handed to or read from the clock is not a valid time
    InvalidTime,
    /// Communication with the clock peripheral failed
    Bus,
}

/// Hardware real-time clock
///
/// Implementations program and read the clock peripheral. Reads are
/// expected to be cheap; the refresh loop calls [`RealTimeClock::now`]
/// on every tick.
pub trait RealTimeClock {
    /// Read the current time
    fn now(&mut self) -> Result<RtcTime, RtcError>;

    /// Program the clock
    fn set(&mut self, time: &RtcTime) -> Result<(), RtcError>;
}
