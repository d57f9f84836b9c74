//! Device settings
//!
//! Settings are read once at boot and never change afterwards. They are
//! stored in flash either as TOML text or as postcard-serialized binary.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum time-service account name length
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum time-service key length
pub const MAX_KEY_LEN: usize = 48;

/// Maximum IANA zone name length
pub const MAX_TIMEZONE_LEN: usize = 40;

/// Zone requested from the time service when local time is off
pub const DEFAULT_TIMEZONE: &str = "Etc/GMT";

/// Settings keys as they appear in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    Ssid,
    Password,
    AioUsername,
    AioKey,
    LocalTimeFlag,
    Timezone,
    TzOffset,
}

impl Key {
    /// All keys, in file order
    pub const ALL: [Key; 7] = [
        Key::Ssid,
        Key::Password,
        Key::AioUsername,
        Key::AioKey,
        Key::LocalTimeFlag,
        Key::Timezone,
        Key::TzOffset,
    ];

    /// Name used in the settings file
    pub fn name(self) -> &'static str {
        match self {
            Key::Ssid => "ssid",
            Key::Password => "password",
            Key::AioUsername => "aio_username",
            Key::AioKey => "aio_key",
            Key::LocalTimeFlag => "LOCAL_TIME_FLAG",
            Key::Timezone => "timezone",
            Key::TzOffset => "tz_offset",
        }
    }

    /// Look up a key by its file name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Network passphrase
    pub password: String<MAX_PASSWORD_LEN>,
    /// Time-service account name
    pub aio_username: String<MAX_USERNAME_LEN>,
    /// Time-service API key
    pub aio_key: String<MAX_KEY_LEN>,
    /// Ask the time service for local time in `timezone`
    pub use_local_time: bool,
    /// IANA zone name used when `use_local_time` is set
    pub timezone: String<MAX_TIMEZONE_LEN>,
    /// Configured offset from UTC in seconds
    pub tz_offset: i32,
}

impl Default for Settings {
    fn default() -> Self {
        let mut timezone = String::new();
        // DEFAULT_TIMEZONE is shorter than MAX_TIMEZONE_LEN
        let _ = timezone.push_str(DEFAULT_TIMEZONE);
        Self {
            ssid: String::new(),
            password: String::new(),
            aio_username: String::new(),
            aio_key: String::new(),
            use_local_time: false,
            timezone,
            tz_offset: 0,
        }
    }
}

// Passphrase and key are never printed
#[cfg(feature = "defmt")]
impl defmt::Format for Settings {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Settings {{ ssid: {=str}, aio_username: {=str}, use_local_time: {=bool}, timezone: {=str}, tz_offset: {=i32} }}",
            self.ssid.as_str(),
            self.aio_username.as_str(),
            self.use_local_time,
            self.timezone.as_str(),
            self.tz_offset
        )
    }
}

impl Settings {
    /// Zone name to put in time-service requests
    pub fn query_timezone(&self) -> &str {
        if self.use_local_time {
            &self.timezone
        } else {
            DEFAULT_TIMEZONE
        }
    }

    /// Check that the time-service account is configured
    pub fn has_service_credentials(&self) -> bool {
        !self.aio_username.is_empty() && !self.aio_key.is_empty()
    }
}
