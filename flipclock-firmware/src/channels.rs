//! Inter-task communication channels
//!
//! Defines the static signals used for communication between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Raised by the stop button; the clock loop exits at its next tick
pub static STOP: Signal<CriticalSectionRawMutex, ()> = Signal::new();
