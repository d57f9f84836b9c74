//! Formatted-string time service
//!
//! The service renders the current time for a named timezone through a
//! strftime template and returns it as a plain-text body:
//!
//! ```text
//! 2022-09-20 23:11:48.347 263 2 +0000 UTC
//! └─date───┘ └─time─────┘ └j┘ └u┘└─z─┘ └Z┘
//! ```
//!
//! `j` is the day of year, `u` the ISO weekday (1 = Monday), `z` the UTC
//! offset and `Z` the zone abbreviation. Parsing is strict: every token has
//! a fixed width and a checked range, and anything unexpected is reported as
//! a typed [`ParseError`].

use chrono::NaiveDate;
use core::fmt::Write;
use heapless::String;

/// Host serving the time API
pub const SERVICE_HOST: &str = "io.adafruit.com";

/// Plain HTTP port used for the time API
pub const SERVICE_PORT: u16 = 80;

/// Capacity of a request path
pub const PATH_CAPACITY: usize = 256;

/// Capacity of the zone abbreviation
pub const ZONE_CAPACITY: usize = 16;

/// `%Y-%m-%d %H:%M:%S.%L %j %u %z %Z`, URL-encoded
pub const TIME_FORMAT: &str = "%25Y-%25m-%25d+%25H%3A%25M%3A%25S.%25L+%25j+%25u+%25z+%25Z";

/// Placeholder written instead of credentials in log-safe paths
const REDACTED: &str = "REDACTED";

/// Errors building a request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PathError {
    /// Path does not fit in [`PATH_CAPACITY`] bytes
    TooLong,
}

/// Build the request path for the current time in `timezone`
///
/// # Arguments
/// * `user` - Service account name
/// * `key` - Service API key
/// * `timezone` - IANA zone name, e.g. `Europe/Lisbon`
pub fn request_path(
    user: &str,
    key: &str,
    timezone: &str,
) -> Result<String<PATH_CAPACITY>, PathError> {
    let mut path = String::new();
    write_path(&mut path, Some((user, key)), timezone)?;
    Ok(path)
}

/// Build the same path as [`request_path`] with the credentials masked
pub fn redacted_path(timezone: &str) -> Result<String<PATH_CAPACITY>, PathError> {
    let mut path = String::new();
    write_path(&mut path, None, timezone)?;
    Ok(path)
}

fn write_path(
    out: &mut String<PATH_CAPACITY>,
    credentials: Option<(&str, &str)>,
    timezone: &str,
) -> Result<(), PathError> {
    push(out, "/api/v2/")?;
    match credentials {
        Some((user, _)) => push_encoded(out, user)?,
        None => push(out, REDACTED)?,
    }
    push(out, "/integrations/time/strftime?x-aio-key=")?;
    match credentials {
        Some((_, key)) => push_encoded(out, key)?,
        None => push(out, REDACTED)?,
    }
    push(out, "&tz=")?;
    push_encoded(out, timezone)?;
    push(out, "&fmt=")?;
    push(out, TIME_FORMAT)
}

fn push(out: &mut String<PATH_CAPACITY>, s: &str) -> Result<(), PathError> {
    out.push_str(s).map_err(|_| PathError::TooLong)
}

/// Percent-encode a query value, leaving `/` intact for zone names
fn push_encoded(out: &mut String<PATH_CAPACITY>, value: &str) -> Result<(), PathError> {
    for byte in value.bytes() {
        let unreserved =
            byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~' | b'/');
        if unreserved {
            out.push(byte as char).map_err(|_| PathError::TooLong)?;
        } else {
            write!(out, "%{:02X}", byte).map_err(|_| PathError::TooLong)?;
        }
    }
    Ok(())
}

/// Fields of a service response, used to locate parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    DayOfYear,
    Weekday,
    UtcOffset,
    Zone,
}

/// Errors parsing a service response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Body carries the service's `error` marker
    ServiceError,
    /// Body ended before this field
    MissingField(Field),
    /// Field has the wrong width or non-digit characters
    InvalidField(Field),
    /// Field is well-formed but outside its calendar range
    OutOfRange(Field),
    /// Extra tokens after the zone abbreviation
    TrailingData,
}

/// A parsed service response
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceTime {
    pub year: u16,
    /// 1-12
    pub month: u8,
    /// 1-31
    pub day: u8,
    /// 0-23
    pub hour: u8,
    /// 0-59
    pub minute: u8,
    /// 0-59, rounded half-up from the fractional seconds
    pub second: u8,
    /// Sub-second part as reported, 0-999
    pub millis: u16,
    /// 1-366, verbatim from the response
    pub day_of_year: u16,
    /// ISO weekday, 1 = Monday ... 7 = Sunday, verbatim from the response
    pub weekday: u8,
    /// Reported offset from UTC in minutes
    pub utc_offset_minutes: i16,
    /// Zone abbreviation, empty when the service sent none
    pub zone: String<ZONE_CAPACITY>,
}

impl ServiceTime {
    /// Reported offset from UTC in seconds
    pub fn utc_offset_seconds(&self) -> i32 {
        i32::from(self.utc_offset_minutes) * 60
    }
}

/// Parse a service response body
///
/// Tokens are separated by ASCII whitespace; surrounding whitespace (such
/// as a trailing newline) is ignored. Seconds are rounded half-up, and a
/// value that rounds to 60 is held at 59 so the minute never advances.
pub fn parse_response(body: &str) -> Result<ServiceTime, ParseError> {
    if body.contains("error") {
        return Err(ParseError::ServiceError);
    }

    let mut tokens = body.split_ascii_whitespace();
    let date = tokens.next().ok_or(ParseError::MissingField(Field::Year))?;
    let time = tokens.next().ok_or(ParseError::MissingField(Field::Hour))?;
    let day_of_year = tokens
        .next()
        .ok_or(ParseError::MissingField(Field::DayOfYear))?;
    let weekday = tokens
        .next()
        .ok_or(ParseError::MissingField(Field::Weekday))?;
    let offset = tokens
        .next()
        .ok_or(ParseError::MissingField(Field::UtcOffset))?;
    let zone = tokens.next().unwrap_or("");
    if tokens.next().is_some() {
        return Err(ParseError::TrailingData);
    }

    let (year, month, day) = parse_date(date)?;
    let (hour, minute, second, millis) = parse_time(time)?;

    let day_of_year = number(Some(day_of_year), 3, Field::DayOfYear)? as u16;
    if NaiveDate::from_yo_opt(i32::from(year), u32::from(day_of_year)).is_none() {
        return Err(ParseError::OutOfRange(Field::DayOfYear));
    }

    let weekday = number(Some(weekday), 1, Field::Weekday)? as u8;
    if !(1..=7).contains(&weekday) {
        return Err(ParseError::OutOfRange(Field::Weekday));
    }

    let utc_offset_minutes = parse_offset(offset)?;
    let zone = String::try_from(zone).map_err(|_| ParseError::InvalidField(Field::Zone))?;

    Ok(ServiceTime {
        year,
        month,
        day,
        hour,
        minute,
        second,
        millis,
        day_of_year,
        weekday,
        utc_offset_minutes,
        zone,
    })
}

fn parse_date(token: &str) -> Result<(u16, u8, u8), ParseError> {
    let mut parts = token.split('-');
    let year = number(parts.next(), 4, Field::Year)? as u16;
    let month = number(parts.next(), 2, Field::Month)? as u8;
    let day = number(parts.next(), 2, Field::Day)? as u8;
    if parts.next().is_some() {
        return Err(ParseError::InvalidField(Field::Day));
    }

    if !(1..=12).contains(&month) {
        return Err(ParseError::OutOfRange(Field::Month));
    }
    if NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day)).is_none() {
        return Err(ParseError::OutOfRange(Field::Day));
    }
    Ok((year, month, day))
}

fn parse_time(token: &str) -> Result<(u8, u8, u8, u16), ParseError> {
    let mut parts = token.split(':');
    let hour = number(parts.next(), 2, Field::Hour)? as u8;
    let minute = number(parts.next(), 2, Field::Minute)? as u8;
    let seconds = parts.next().ok_or(ParseError::MissingField(Field::Second))?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidField(Field::Second));
    }

    if hour > 23 {
        return Err(ParseError::OutOfRange(Field::Hour));
    }
    if minute > 59 {
        return Err(ParseError::OutOfRange(Field::Minute));
    }

    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => {
            let valid = (1..=9).contains(&fraction.len())
                && fraction.bytes().all(|b| b.is_ascii_digit());
            if !valid {
                return Err(ParseError::InvalidField(Field::Second));
            }
            (whole, fraction)
        }
        None => (seconds, ""),
    };

    // 60 is a leap second
    let whole = number(Some(whole), 2, Field::Second)? as u8;
    if whole > 60 {
        return Err(ParseError::OutOfRange(Field::Second));
    }

    let round_up = fraction.bytes().next().is_some_and(|b| b >= b'5');
    let second = (whole + u8::from(round_up)).min(59);

    let mut millis = 0u16;
    let mut digits = fraction.bytes();
    for _ in 0..3 {
        let digit = digits.next().map_or(0, |b| u16::from(b - b'0'));
        millis = millis * 10 + digit;
    }

    Ok((hour, minute, second, millis))
}

/// Parse `±HHMM` into minutes east of UTC
fn parse_offset(token: &str) -> Result<i16, ParseError> {
    if token.len() != 5 || !token.is_ascii() {
        return Err(ParseError::InvalidField(Field::UtcOffset));
    }
    let sign = match token.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(ParseError::InvalidField(Field::UtcOffset)),
    };
    let hours = number(Some(&token[1..3]), 2, Field::UtcOffset)? as i16;
    let minutes = number(Some(&token[3..5]), 2, Field::UtcOffset)? as i16;
    if hours > 23 || minutes > 59 {
        return Err(ParseError::OutOfRange(Field::UtcOffset));
    }
    Ok(sign * (hours * 60 + minutes))
}

/// Parse a fixed-width run of ASCII digits
fn number(part: Option<&str>, width: usize, field: Field) -> Result<u32, ParseError> {
    let part = part.ok_or(ParseError::MissingField(field))?;
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::InvalidField(field));
    }
    Ok(part
        .bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b - b'0')))
}
