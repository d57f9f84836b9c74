//! Settings persistence
//!
//! Loads settings overrides from flash storage. The caller falls back to
//! the settings file embedded at build time when flash is empty.

use core::str;
use defmt::*;

use flipclock_core::config::{parse_settings, Settings};
use flipclock_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
// Import the FlashStorage trait to bring methods into scope
use flipclock_hal_rp2040::FlashStorageTrait;

/// Maximum serialized settings size (binary)
const MAX_SETTINGS_SIZE: usize = 512;

/// Maximum settings file size
const MAX_TOML_SIZE: usize = 2048;

/// Settings persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Settings file rejected by the parser
    Parse(flipclock_core::config::SettingsError),
    /// Invalid UTF-8 in the stored settings file
    InvalidUtf8,
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

impl LoadError {
    /// Nothing stored under either key
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::Flash(FlashError::NotFound))
    }
}

/// Settings store backed by the flash partition
pub struct SettingsStore<'d> {
    storage: Rp2040FlashStorage<'d>,
}

impl<'d> SettingsStore<'d> {
    pub fn new(storage: Rp2040FlashStorage<'d>) -> Self {
        Self { storage }
    }

    /// Load settings from flash
    ///
    /// Tries the settings file first, then the binary postcard form. A
    /// stored settings file that cannot be read is an error, not a reason
    /// to try the binary copy.
    pub async fn load(&mut self) -> Result<Settings, LoadError> {
        info!("Loading settings from flash...");

        match self.load_toml().await {
            Ok(settings) => {
                info!("Loaded settings file from flash");
                return Ok(settings);
            }
            Err(LoadError::Flash(FlashError::NotFound)) => {
                debug!("No settings file in flash, trying binary format");
            }
            Err(e) => return Err(e),
        }

        self.load_binary().await
    }

    async fn load_toml(&mut self) -> Result<Settings, LoadError> {
        let mut buffer = [0u8; MAX_TOML_SIZE];
        let len = self
            .storage
            .read(StorageKey::SettingsToml, &mut buffer)
            .await?;

        debug!("Read {} bytes of settings file from flash", len);

        let text = str::from_utf8(&buffer[..len]).map_err(|_| LoadError::InvalidUtf8)?;
        let settings = parse_settings(text).map_err(LoadError::Parse)?;

        log_settings_summary(&settings);
        Ok(settings)
    }

    async fn load_binary(&mut self) -> Result<Settings, LoadError> {
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let len = self.storage.read(StorageKey::Settings, &mut buffer).await?;

        debug!("Read {} bytes of binary settings from flash", len);

        let settings: Settings =
            postcard::from_bytes(&buffer[..len]).map_err(|_| LoadError::Deserialize)?;

        log_settings_summary(&settings);
        Ok(settings)
    }
}

/// Log a summary of the loaded settings; credentials are never logged
pub fn log_settings_summary(settings: &Settings) {
    info!("Settings loaded for network \"{}\"", settings.ssid.as_str());
    if settings.use_local_time {
        debug!(
            "  local time: {} (offset {} s)",
            settings.timezone.as_str(),
            settings.tz_offset
        );
    } else {
        debug!("  local time: off, using {}", settings.query_timezone());
    }
    debug!(
        "  time service credentials: {}",
        if settings.has_service_credentials() {
            "present"
        } else {
            "absent"
        }
    );
}
