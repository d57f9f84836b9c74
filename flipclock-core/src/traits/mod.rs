//! Display abstraction traits
//!
//! Hardware traits (RTC, network, flash) live in `flipclock-hal`; the clock
//! face is defined here because it speaks in display values rather than
//! hardware terms.

pub mod face;

pub use face::{ClockFace, FaceError};
