//! Board-agnostic core logic for the flip-clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Calendar time and two-digit display formatting
//! - Settings and the settings file parser
//! - Time source: fetch, timezone policy, RTC programming and fallback
//! - Refresh loop: sync state machine, schedule, change tracking, session
//! - Network bootstrap with capped exponential backoff
//! - The clock face trait the display implements

#![no_std]
#![deny(unsafe_code)]

pub mod config;
#[cfg(test)]
mod mock;
pub mod net;
pub mod refresh;
pub mod sync;
pub mod time;
pub mod traits;
