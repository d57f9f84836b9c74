//! Settings partition on the Pico W flash
//!
//! The last 64 KiB of the 2 MiB flash hold a sequential-storage map keyed
//! by [`StorageKey`]. Only lookups are needed on the device.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use flipclock_hal::flash::{FlashError, StorageKey};

/// Flash fitted to the Pico W
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Size of the settings partition at the end of flash
pub const SETTINGS_PARTITION_SIZE: usize = 64 * 1024;

/// Largest stored item, key byte included
pub const MAX_ITEM_SIZE: usize = 2048;

/// Byte range of the settings partition
pub const SETTINGS_RANGE: Range<u32> =
    ((FLASH_SIZE - SETTINGS_PARTITION_SIZE) as u32)..(FLASH_SIZE as u32);

/// Settings partition reader
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }
}

impl flipclock_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut scratch = [0u8; MAX_ITEM_SIZE];

        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut scratch,
            &key,
        )
        .await
        .map_err(|_| FlashError::Storage)?
        .ok_or(FlashError::NotFound)?;

        let dst = buffer
            .get_mut(..item.len())
            .ok_or(FlashError::BufferTooSmall)?;
        dst.copy_from_slice(item);
        Ok(item.len())
    }
}
