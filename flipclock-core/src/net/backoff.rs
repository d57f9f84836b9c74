//! Capped exponential backoff

/// First retry delay (ms)
pub const DEFAULT_BASE_MS: u32 = 500;

/// Longest retry delay (ms)
pub const DEFAULT_MAX_MS: u32 = 10_000;

/// Attempts before giving up
pub const DEFAULT_MAX_ATTEMPTS: u8 = 10;

/// Retry policy: the delay doubles after every failure up to a cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Backoff {
    pub base_ms: u32,
    pub max_ms: u32,
    pub max_attempts: u8,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base_ms: DEFAULT_BASE_MS,
            max_ms: DEFAULT_MAX_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u8) -> u32 {
        let doublings = u32::from(attempt.saturating_sub(1));
        let factor = 1u32.checked_shl(doublings).unwrap_or(u32::MAX);
        self.base_ms.saturating_mul(factor).min(self.max_ms)
    }

    /// Whether another attempt is allowed after `attempt` attempts
    pub fn allows_retry(&self, attempt: u8) -> bool {
        attempt < self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_schedule() {
        let backoff = Backoff::default();
        let delays: [u32; 8] = core::array::from_fn(|i| backoff.delay_for(i as u8 + 1));
        assert_eq!(
            delays,
            [500, 1_000, 2_000, 4_000, 8_000, 10_000, 10_000, 10_000]
        );
    }

    #[test]
    fn test_retry_limit() {
        let backoff = Backoff::default();
        assert!(backoff.allows_retry(9));
        assert!(!backoff.allows_retry(10));
    }

    proptest! {
        #[test]
        fn prop_delay_is_monotonic_and_capped(attempt in 1u8..=255) {
            let backoff = Backoff::default();
            let delay = backoff.delay_for(attempt);
            prop_assert!(delay <= backoff.max_ms);
            prop_assert!(delay >= backoff.delay_for(attempt - 1));
        }
    }
}
