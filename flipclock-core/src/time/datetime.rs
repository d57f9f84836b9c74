//! Calendar date and time
//!
//! Calendar arithmetic is delegated to `chrono`'s naive types; this module
//! only adds the supported year window and the derived fields the clock
//! hardware stores.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use flipclock_hal::{RtcTime, DST_UNKNOWN};
use flipclock_protocol::ServiceTime;

/// Earliest supported year
pub const MIN_YEAR: u16 = 1970;
/// Latest supported year
pub const MAX_YEAR: u16 = 2099;

/// Errors constructing a [`DateTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Month, day or time-of-day field out of range
    InvalidDate,
    /// Weekday number out of range
    InvalidWeekday,
    /// Day of year out of range for the year
    InvalidDayOfYear,
    /// Year outside [`MIN_YEAR`]..=[`MAX_YEAR`]
    OutOfRange,
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// 0 = Monday ... 6 = Sunday
    pub fn index(self) -> u8 {
        self as u8
    }

    /// ISO 8601 number, 1 = Monday ... 7 = Sunday
    pub fn iso_number(self) -> u8 {
        self.index() + 1
    }

    /// From a zero-based index, 0 = Monday
    pub fn from_index(index: u8) -> Option<Self> {
        use Weekday::*;
        match index {
            0 => Some(Monday),
            1 => Some(Tuesday),
            2 => Some(Wednesday),
            3 => Some(Thursday),
            4 => Some(Friday),
            5 => Some(Saturday),
            6 => Some(Sunday),
            _ => None,
        }
    }

    /// From an ISO 8601 number, 1 = Monday
    pub fn from_iso(number: u8) -> Option<Self> {
        number.checked_sub(1).and_then(Self::from_index)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        Self::from_index(weekday.num_days_from_monday() as u8).unwrap_or(Weekday::Monday)
    }
}

/// A calendar timestamp with derived weekday and day of year
///
/// There is no timezone attached; the clock keeps local wall-clock time
/// and the DST flag is always unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59
    pub second: u8,
    pub weekday: Weekday,
    /// 1-366
    pub day_of_year: u16,
}

impl DateTime {
    /// Build a timestamp from calendar fields, deriving weekday and day of year
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, TimeError> {
        Self::from_naive(naive(year, month, day, hour, minute, second)?)
    }

    /// Time programmed when no time has ever been obtained
    ///
    /// 2022-09-17 12:00:00, a Saturday, day 260.
    pub fn fallback_epoch() -> Self {
        Self {
            year: 2022,
            month: 9,
            day: 17,
            hour: 12,
            minute: 0,
            second: 0,
            weekday: Weekday::Saturday,
            day_of_year: 260,
        }
    }

    /// Build from seconds since 1970-01-01 00:00:00
    pub fn from_unix(seconds: i64) -> Result<Self, TimeError> {
        let utc = chrono::DateTime::from_timestamp(seconds, 0).ok_or(TimeError::OutOfRange)?;
        Self::from_naive(utc.naive_utc())
    }

    /// Seconds since 1970-01-01 00:00:00, treating the fields as UTC
    ///
    /// Hand-assembled values with impossible fields map to 0.
    pub fn to_unix(&self) -> i64 {
        naive(self.year, self.month, self.day, self.hour, self.minute, self.second)
            .map_or(0, |naive| naive.and_utc().timestamp())
    }

    /// Shift by a number of seconds, recomputing all derived fields
    pub fn offset_by(&self, seconds: i64) -> Result<Self, TimeError> {
        Self::from_unix(self.to_unix() + seconds)
    }

    fn from_naive(naive: NaiveDateTime) -> Result<Self, TimeError> {
        let year = u16::try_from(naive.year()).map_err(|_| TimeError::OutOfRange)?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(TimeError::OutOfRange);
        }
        Ok(Self {
            year,
            month: naive.month() as u8,
            day: naive.day() as u8,
            hour: naive.hour() as u8,
            minute: naive.minute() as u8,
            second: naive.second() as u8,
            weekday: naive.weekday().into(),
            day_of_year: naive.ordinal() as u16,
        })
    }
}

impl From<DateTime> for RtcTime {
    fn from(time: DateTime) -> Self {
        RtcTime {
            year: time.year,
            month: time.month,
            day: time.day,
            hour: time.hour,
            minute: time.minute,
            second: time.second,
            weekday: time.weekday.index(),
            yearday: time.day_of_year,
            isdst: DST_UNKNOWN,
        }
    }
}

impl TryFrom<RtcTime> for DateTime {
    type Error = TimeError;

    /// Weekday and day of year are taken from the clock as stored
    fn try_from(rtc: RtcTime) -> Result<Self, Self::Error> {
        naive(rtc.year, rtc.month, rtc.day, rtc.hour, rtc.minute, rtc.second)?;
        let weekday = Weekday::from_index(rtc.weekday).ok_or(TimeError::InvalidWeekday)?;
        Ok(Self {
            year: rtc.year,
            month: rtc.month,
            day: rtc.day,
            hour: rtc.hour,
            minute: rtc.minute,
            second: rtc.second,
            weekday,
            day_of_year: rtc.yearday,
        })
    }
}

impl TryFrom<&ServiceTime> for DateTime {
    type Error = TimeError;

    /// Day of year and weekday are taken verbatim from the response
    fn try_from(service: &ServiceTime) -> Result<Self, Self::Error> {
        naive(
            service.year,
            service.month,
            service.day,
            service.hour,
            service.minute,
            service.second,
        )?;
        let weekday = Weekday::from_iso(service.weekday).ok_or(TimeError::InvalidWeekday)?;
        if NaiveDate::from_yo_opt(i32::from(service.year), u32::from(service.day_of_year)).is_none() {
            return Err(TimeError::InvalidDayOfYear);
        }
        Ok(Self {
            year: service.year,
            month: service.month,
            day: service.day,
            hour: service.hour,
            minute: service.minute,
            second: service.second,
            weekday,
            day_of_year: service.day_of_year,
        })
    }
}

/// Check the fields and build the matching naive timestamp
fn naive(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
) -> Result<NaiveDateTime, TimeError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(TimeError::OutOfRange);
    }
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
        .ok_or(TimeError::InvalidDate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_derives_weekday_and_yday() {
        let time = DateTime::new(2022, 9, 20, 23, 11, 48).unwrap();
        assert_eq!(time.weekday, Weekday::Tuesday);
        assert_eq!(time.day_of_year, 263);
    }

    #[test]
    fn test_fallback_epoch_is_consistent() {
        let epoch = DateTime::fallback_epoch();
        assert_eq!(DateTime::new(2022, 9, 17, 12, 0, 0).unwrap(), epoch);
    }

    #[test]
    fn test_unix_conversions() {
        assert_eq!(DateTime::new(1970, 1, 1, 0, 0, 0).unwrap().to_unix(), 0);

        let time = DateTime::from_unix(1_663_715_508).unwrap();
        assert_eq!(time, DateTime::new(2022, 9, 20, 23, 11, 48).unwrap());

        let leap = DateTime::from_unix(1_709_208_000).unwrap();
        assert_eq!((leap.month, leap.day, leap.hour), (2, 29, 12));
        assert_eq!(leap.day_of_year, 60);
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(DateTime::from_unix(-1), Err(TimeError::OutOfRange));
        assert_eq!(
            DateTime::new(2100, 1, 1, 0, 0, 0),
            Err(TimeError::OutOfRange)
        );
        assert_eq!(
            DateTime::new(2023, 2, 29, 0, 0, 0),
            Err(TimeError::InvalidDate)
        );
    }

    #[test]
    fn test_offset_crosses_midnight() {
        let time = DateTime::new(2022, 12, 31, 23, 30, 0).unwrap();
        let shifted = time.offset_by(3600).unwrap();
        assert_eq!(shifted, DateTime::new(2023, 1, 1, 0, 30, 0).unwrap());
        assert_eq!(shifted.weekday, Weekday::Sunday);
        assert_eq!(shifted.day_of_year, 1);
    }

    #[test]
    fn test_rtc_record() {
        let time = DateTime::new(2022, 9, 20, 23, 11, 48).unwrap();
        let rtc = RtcTime::from(time);
        assert_eq!(rtc.weekday, 1);
        assert_eq!(rtc.yearday, 263);
        assert_eq!(rtc.isdst, DST_UNKNOWN);
        assert_eq!(DateTime::try_from(rtc), Ok(time));

        let bad = RtcTime { weekday: 9, ..rtc };
        assert_eq!(DateTime::try_from(bad), Err(TimeError::InvalidWeekday));
    }

    #[test]
    fn test_service_time_fields_verbatim() {
        let service =
            flipclock_protocol::timeservice::parse_response("2022-09-20 23:11:48.347 263 2 +0000 UTC")
                .unwrap();
        let time = DateTime::try_from(&service).unwrap();

        assert_eq!(
            (time.year, time.month, time.day, time.hour, time.minute, time.second),
            (2022, 9, 20, 23, 11, 48)
        );
        assert_eq!(time.day_of_year, 263);
        assert_eq!(time.weekday.iso_number(), 2);
    }

    #[test]
    fn test_century_leap_rules() {
        assert!(DateTime::new(2000, 2, 29, 0, 0, 0).is_ok());
        assert_eq!(
            DateTime::new(2100, 2, 29, 0, 0, 0),
            Err(TimeError::OutOfRange)
        );
        assert_eq!(DateTime::new(2000, 12, 31, 0, 0, 0).unwrap().day_of_year, 366);
        assert_eq!(DateTime::new(2023, 12, 31, 0, 0, 0).unwrap().day_of_year, 365);
    }

    #[test]
    fn test_service_day_of_year_checked_against_year() {
        let mut service =
            flipclock_protocol::timeservice::parse_response("2024-12-31 12:00:00.000 366 2 +0000 UTC")
                .unwrap();
        assert_eq!(DateTime::try_from(&service).unwrap().day_of_year, 366);

        service.year = 2023;
        assert_eq!(
            DateTime::try_from(&service),
            Err(TimeError::InvalidDayOfYear)
        );
    }

    #[test]
    fn test_weekday_numbering() {
        assert_eq!(Weekday::from_iso(7), Some(Weekday::Sunday));
        assert_eq!(Weekday::from_iso(0), None);
        assert_eq!(Weekday::Sunday.index(), 6);
        assert_eq!(Weekday::from(chrono::Weekday::Thu), Weekday::Thursday);
    }

    proptest! {
        #[test]
        fn prop_unix_conversion_is_consistent(seconds in 0i64..4_102_444_800) {
            let time = DateTime::from_unix(seconds).unwrap();
            prop_assert_eq!(time.to_unix(), seconds);
            let rebuilt = DateTime::new(
                time.year, time.month, time.day, time.hour, time.minute, time.second,
            ).unwrap();
            prop_assert_eq!(rebuilt, time);
        }
    }
}
