//! RP2040 (Pico W) HAL for the flip-clock firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `flipclock-hal` traits:
//!
//! - On-chip RTC (implements `flipclock_hal::RealTimeClock`)
//! - CYW43 radio association (implements `flipclock_hal::WifiLink`)
//! - HTTP over an `embassy-net` TCP socket (implements `flipclock_hal::HttpTransport`)
//! - UDP exchange for NTP (implements `flipclock_hal::DatagramTransport`)
//! - Settings partition reader (implements `flipclock_hal::FlashStorage`)

#![no_std]

pub mod flash;
pub mod http;
pub mod link;
pub mod rtc;
pub mod udp;

// Re-export shared traits from flipclock-hal for convenience
pub use flipclock_hal::{FlashStorage as FlashStorageTrait, StorageKey};

pub use flash::Rp2040FlashStorage;
pub use http::TcpHttp;
pub use link::CywLink;
pub use rtc::Rp2040Rtc;
pub use udp::UdpExchange;
