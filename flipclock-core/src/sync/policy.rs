//! Timezone policy
//!
//! Decides whether a fetched wall-clock time is already local or has to be
//! shifted by the configured offset.

use crate::config::Settings;
use crate::time::{DateTime, TimeError};

/// How fetched times are turned into local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimezonePolicy {
    /// Local time requested from the source
    pub use_local_time: bool,
    /// Configured offset from UTC in seconds
    pub tz_offset: i32,
}

impl TimezonePolicy {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            use_local_time: settings.use_local_time,
            tz_offset: settings.tz_offset,
        }
    }

    /// Whether a time reported with `reported_offset` is used unmodified
    ///
    /// Both offsets must be non-zero: a zero reported offset means the
    /// source answered in UTC whatever was asked for.
    pub fn trusts_source(&self, reported_offset: i32) -> bool {
        self.use_local_time && self.tz_offset != 0 && reported_offset != 0
    }

    /// Resolve a fetched wall-clock time to local time
    ///
    /// # Arguments
    /// * `wall` - Time as reported by the source
    /// * `reported_offset` - Source's offset from UTC in seconds
    pub fn resolve(&self, wall: DateTime, reported_offset: i32) -> Result<DateTime, TimeError> {
        if self.trusts_source(reported_offset) {
            return Ok(wall);
        }
        let utc = wall.to_unix() - i64::from(reported_offset);
        DateTime::from_unix(utc + i64::from(self.tz_offset))
    }
}
