//! Resync schedule
//!
//! Tracks when the last resync happened against a monotonic millisecond
//! clock supplied by the caller.

/// Resync interval for the time-service profile (ms)
pub const SERVICE_SYNC_INTERVAL_MS: u64 = 120_000;

/// Resync interval for the NTP profile (ms)
pub const NTP_SYNC_INTERVAL_MS: u64 = 600_000;

/// Fixed-interval resync schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResyncSchedule {
    interval_ms: u64,
    last_sync_ms: Option<u64>,
}

impl ResyncSchedule {
    /// Schedule that is due immediately
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_sync_ms: None,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Check whether a resync is due at `now_ms`
    pub fn is_due(&self, now_ms: u64) -> bool {
        match self.last_sync_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Record a resync at `now_ms`
    pub fn mark_synced(&mut self, now_ms: u64) {
        self.last_sync_ms = Some(now_ms);
    }

    /// Milliseconds until the next resync is due
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_sync_ms {
            None => 0,
            Some(last) => self
                .interval_ms
                .saturating_sub(now_ms.saturating_sub(last)),
        }
    }
}
