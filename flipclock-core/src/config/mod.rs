//! Configuration types and parsing
//!
//! Settings come from a small TOML file; see [`toml`] for the supported
//! subset.

pub mod settings;
pub mod toml;

pub use settings::{Key, Settings, DEFAULT_TIMEZONE};
pub use toml::{parse_settings, SettingsError};
