//! Settings partition in flash
//!
//! The firmware reads user settings from a small key-value partition at
//! boot. Items are written by external tooling, so the device side only
//! needs lookups.

/// Item keys in the settings partition
///
/// Wall-clock time is never stored here; the RTC holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// `Settings` encoded with postcard
    Settings = 0,
    /// A settings file in the same format as the embedded `settings.toml`
    SettingsToml = 1,
}

impl StorageKey {
    pub const ALL: [StorageKey; 2] = [StorageKey::Settings, StorageKey::SettingsToml];

    /// On-flash tag byte
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_u8() == value)
    }
}

/// Settings partition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The partition could not be read or is corrupt
    Storage,
    /// No item under the key
    NotFound,
    /// Item is larger than the caller's buffer
    BufferTooSmall,
}

/// Read access to the settings partition
pub trait FlashStorage {
    /// Copy the item stored under `key` into `buffer`
    ///
    /// Returns the item length.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;
}

#[cfg(feature = "sequential-storage")]
mod map_key {
    use sequential_storage::map::{Key, SerializationError};

    use super::StorageKey;

    /// Keys are stored as their tag byte
    impl Key for StorageKey {
        fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
            let slot = buffer
                .first_mut()
                .ok_or(SerializationError::BufferTooSmall)?;
            *slot = self.as_u8();
            Ok(1)
        }

        fn deserialize_from(buffer: &[u8]) -> Result<(Self, usize), SerializationError> {
            let tag = buffer.first().ok_or(SerializationError::BufferTooSmall)?;
            StorageKey::from_u8(*tag)
                .map(|key| (key, 1))
                .ok_or(SerializationError::InvalidFormat)
        }
    }
}
