//! Network time synchronisation
//!
//! - [`fetch`]: one request against the time service or an NTP server
//! - [`policy`]: timezone handling of the fetched time
//! - [`source`]: programs the hardware clock, with fallback on failure

pub mod fetch;
pub mod policy;
pub mod source;

pub use fetch::{FetchError, FetchedTime, NtpFetcher, ServiceFetcher, TimeFetch};
pub use policy::TimezonePolicy;
pub use source::{FallbackCause, SyncOutcome, TimeSource, RTC_SETTLE_MS};
