//! On-chip real-time clock
//!
//! The RP2040 RTC stores the date, time and weekday but neither the day
//! of year nor a DST flag. Day of year is derived from the date on read;
//! DST is always reported as unknown.

use chrono::{Datelike, NaiveDate};
use embassy_rp::rtc::{DateTime, DayOfWeek, Instance, Rtc, RtcError as HwError};
use flipclock_hal::{RealTimeClock, RtcError, RtcTime, DST_UNKNOWN};

/// RP2040 RTC wrapper
pub struct Rp2040Rtc<'d, T: Instance> {
    rtc: Rtc<'d, T>,
}

impl<'d, T: Instance> Rp2040Rtc<'d, T> {
    pub fn new(rtc: Rtc<'d, T>) -> Self {
        Self { rtc }
    }
}

impl<T: Instance> RealTimeClock for Rp2040Rtc<'_, T> {
    fn now(&mut self) -> Result<RtcTime, RtcError> {
        let now = self.rtc.now().map_err(map_error)?;
        Ok(RtcTime {
            year: now.year,
            month: now.month,
            day: now.day,
            hour: now.hour,
            minute: now.minute,
            second: now.second,
            weekday: weekday_index(now.day_of_week),
            yearday: day_of_year(now.year, now.month, now.day),
            isdst: DST_UNKNOWN,
        })
    }

    fn set(&mut self, time: &RtcTime) -> Result<(), RtcError> {
        let day_of_week = day_of_week(time.weekday).ok_or(RtcError::InvalidTime)?;
        self.rtc
            .set_datetime(DateTime {
                year: time.year,
                month: time.month,
                day: time.day,
                day_of_week,
                hour: time.hour,
                minute: time.minute,
                second: time.second,
            })
            .map_err(map_error)
    }
}

fn map_error(err: HwError) -> RtcError {
    match err {
        HwError::NotRunning => RtcError::NotRunning,
        _ => RtcError::InvalidTime,
    }
}

/// Monday-based index of a hardware weekday
fn weekday_index(day: DayOfWeek) -> u8 {
    match day {
        DayOfWeek::Monday => 0,
        DayOfWeek::Tuesday => 1,
        DayOfWeek::Wednesday => 2,
        DayOfWeek::Thursday => 3,
        DayOfWeek::Friday => 4,
        DayOfWeek::Saturday => 5,
        DayOfWeek::Sunday => 6,
    }
}

fn day_of_week(index: u8) -> Option<DayOfWeek> {
    Some(match index {
        0 => DayOfWeek::Monday,
        1 => DayOfWeek::Tuesday,
        2 => DayOfWeek::Wednesday,
        3 => DayOfWeek::Thursday,
        4 => DayOfWeek::Friday,
        5 => DayOfWeek::Saturday,
        6 => DayOfWeek::Sunday,
        _ => return None,
    })
}

/// 0 when the hardware holds an impossible date
fn day_of_year(year: u16, month: u8, day: u8) -> u16 {
    NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .map_or(0, |date| date.ordinal() as u16)
}
