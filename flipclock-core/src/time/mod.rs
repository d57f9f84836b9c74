//! Calendar time and display formatting

pub mod datetime;
pub mod digits;

pub use datetime::{DateTime, TimeError, Weekday};
pub use digits::{DigitPair, FormatError};
