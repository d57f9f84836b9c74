//! Network bootstrap
//!
//! Joins the wireless network, retrying with capped exponential backoff and
//! giving up after a bounded number of attempts.

use embedded_hal_async::delay::DelayNs;

use flipclock_hal::{LinkError, WifiLink};

use super::backoff::Backoff;

/// Errors from [`connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectError {
    /// Every attempt failed; `last` is the final failure
    Exhausted { attempts: u8, last: LinkError },
}

/// A failed join attempt, reported before the backoff pause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoinFailure {
    pub attempt: u8,
    pub error: LinkError,
    /// Pause before the next attempt, `None` after the last one
    pub retry_in_ms: Option<u32>,
}

/// Join the network
///
/// Returns the number of join attempts made; zero when the link was
/// already up. `on_failure` is called after each failed attempt so the
/// caller can log it.
pub async fn connect<L, D>(
    link: &mut L,
    ssid: &str,
    password: &str,
    backoff: &Backoff,
    delay: &mut D,
    mut on_failure: impl FnMut(JoinFailure),
) -> Result<u8, ConnectError>
where
    L: WifiLink,
    D: DelayNs,
{
    if link.is_connected() {
        return Ok(0);
    }

    let mut attempt = 1;
    loop {
        let error = match link.join(ssid, password).await {
            Ok(()) => return Ok(attempt),
            Err(e) => e,
        };

        if !backoff.allows_retry(attempt) {
            on_failure(JoinFailure {
                attempt,
                error,
                retry_in_ms: None,
            });
            return Err(ConnectError::Exhausted {
                attempts: attempt,
                last: error,
            });
        }

        let wait = backoff.delay_for(attempt);
        on_failure(JoinFailure {
            attempt,
            error,
            retry_in_ms: Some(wait),
        });
        delay.delay_ms(wait).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{MockDelay, MockLink};
    use embassy_futures::block_on;
    use std::vec;
    use std::vec::Vec;

    #[test]
    fn test_connects_after_transient_failures() {
        let mut link = MockLink::failing(3);
        let mut delay = MockDelay::new();
        let mut failures = Vec::new();

        let attempts = block_on(connect(
            &mut link,
            "net",
            "pw",
            &Backoff::default(),
            &mut delay,
            |f| failures.push(f),
        ))
        .unwrap();

        assert_eq!(attempts, 4);
        assert!(link.is_connected());
        assert_eq!(delay.calls, vec![500, 1_000, 2_000]);
        assert_eq!(failures.len(), 3);
        assert_eq!(failures[0].error, LinkError::JoinFailed(1));
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let mut link = MockLink::failing(u8::MAX);
        let mut delay = MockDelay::new();
        let mut last = None;

        let result = block_on(connect(
            &mut link,
            "net",
            "pw",
            &Backoff::default(),
            &mut delay,
            |f| last = Some(f),
        ));

        assert_eq!(
            result,
            Err(ConnectError::Exhausted {
                attempts: 10,
                last: LinkError::JoinFailed(10),
            })
        );
        assert_eq!(link.joins, 10);
        // No pause after the final attempt
        assert_eq!(delay.calls.len(), 9);
        assert_eq!(delay.total_ms(), 500 + 1_000 + 2_000 + 4_000 + 8_000 + 4 * 10_000);
        assert_eq!(last.map(|f| f.retry_in_ms), Some(None));
    }

    #[test]
    fn test_already_connected() {
        let mut link = MockLink::failing(0);
        link.connected = true;
        let mut delay = MockDelay::new();

        let attempts = block_on(connect(
            &mut link,
            "net",
            "pw",
            &Backoff::default(),
            &mut delay,
            |_| {},
        ))
        .unwrap();

        assert_eq!(attempts, 0);
        assert_eq!(link.joins, 0);
    }
}
