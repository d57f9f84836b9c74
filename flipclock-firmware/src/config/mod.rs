//! Settings loading
//!
//! Settings come from flash when present, otherwise from the settings
//! file embedded at build time.

pub mod loader;

use defmt::*;
use embassy_rp::dma::Channel;
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

use flipclock_core::config::{parse_settings, Settings};
use flipclock_hal_rp2040::Rp2040FlashStorage;

pub use loader::{log_settings_summary, LoadError, SettingsStore};

/// Settings file validated by build.rs
const EMBEDDED_SETTINGS: &str = include_str!("../../settings.toml");

/// Load settings, preferring flash over the embedded file
///
/// Settings that are present but unusable halt the firmware, as does an
/// embedded file that fails to parse (build.rs should have caught it).
pub async fn load_settings(
    flash: Peri<'static, FLASH>,
    dma: Peri<'static, impl Channel>,
) -> Settings {
    let mut store = SettingsStore::new(Rp2040FlashStorage::new(flash, dma));

    match store.load().await {
        Ok(settings) => return settings,
        Err(e) if e.is_not_found() => info!("No settings in flash, using embedded settings"),
        Err(e) => defmt::panic!("Stored settings unusable: {}", e),
    }

    match parse_settings(EMBEDDED_SETTINGS) {
        Ok(settings) => {
            log_settings_summary(&settings);
            settings
        }
        Err(e) => defmt::panic!("Embedded settings invalid: {}", e),
    }
}
