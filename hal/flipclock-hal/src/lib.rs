//! Flipclock Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that can be implemented
//! by chip-specific HALs. The clock logic in `flipclock-core` is written
//! against these traits only, so it runs unchanged on the device and in
//! host-side tests with mock implementations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (flipclock-firmware)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flipclock-core (board-agnostic logic)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  flipclock-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!            ┌─────────────────┐
//!            │ flipclock-hal-  │
//!            │     rp2040      │
//!            └─────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`rtc::RealTimeClock`] - Battery-backed wall clock
//! - [`net::WifiLink`] - Wireless association
//! - [`net::HttpTransport`] - Best-effort HTTP GET
//! - [`net::DatagramTransport`] - Single request/response UDP exchange
//! - [`flash::FlashStorage`] - Settings partition lookups

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
pub mod net;
pub mod rtc;

// Re-export key traits at crate root for convenience
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use net::{
    DatagramTransport, HttpReply, HttpTransport, LinkError, TransportError, WifiLink,
};
pub use rtc::{RealTimeClock, RtcError, RtcTime, DST_UNKNOWN};
