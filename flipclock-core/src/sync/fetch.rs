//! Time fetchers
//!
//! A fetcher performs one network time request and returns the wall-clock
//! time the server reported together with the server's UTC offset. Two
//! fetchers exist: the formatted-string HTTP time service and NTP.

use embedded_hal_async::delay::DelayNs;
use heapless::{String, Vec};

use flipclock_hal::{DatagramTransport, HttpTransport, TransportError};
use flipclock_protocol::timeservice::{self, PathError, PATH_CAPACITY, SERVICE_HOST};
use flipclock_protocol::{ntp, NtpError, ParseError, NTP_PACKET_SIZE, NTP_PORT};

use crate::config::Settings;
use crate::time::{DateTime, TimeError};

/// Time-service response bodies are a single short line
pub const BODY_CAPACITY: usize = 128;

/// NTP attempts per resync
pub const NTP_MAX_ATTEMPTS: u8 = 10;

/// Pause between NTP attempts (ms)
pub const NTP_RETRY_DELAY_MS: u32 = 5_000;

/// Errors from a time fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FetchError {
    /// Network-level failure
    Transport(TransportError),
    /// Invalid NTP reply on the final attempt
    Ntp(NtpError),
    /// Time-service body was rejected by the parser
    Service(ParseError),
    /// Time-service body is not UTF-8
    Encoding,
    /// Reported time is outside the supported range
    Time(TimeError),
}

impl FetchError {
    /// Whether the failure is the network's rather than the response's
    ///
    /// Transport failures trigger the clock fallback; anything else aborts
    /// the resync without touching the clock. An HTTP error status is the
    /// service answering, so it counts as a rejected response.
    pub fn is_transport(&self) -> bool {
        match self {
            FetchError::Transport(TransportError::Status(_)) => false,
            FetchError::Transport(_) | FetchError::Ntp(_) => true,
            FetchError::Service(_) | FetchError::Encoding | FetchError::Time(_) => false,
        }
    }
}

/// A successfully fetched time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FetchedTime {
    /// Wall-clock time as reported
    pub wall: DateTime,
    /// Reported offset from UTC in seconds
    pub utc_offset: i32,
    /// Requests made, including the successful one
    pub attempts: u8,
}

/// A network time source
pub trait TimeFetch {
    /// Fetch the current time
    ///
    /// `delay` is used for pauses between retries.
    fn fetch<D: DelayNs>(
        &mut self,
        delay: &mut D,
    ) -> impl core::future::Future<Output = Result<FetchedTime, FetchError>>;
}

/// Fetcher for the formatted-string HTTP time service
pub struct ServiceFetcher<H> {
    http: H,
    path: String<PATH_CAPACITY>,
    redacted: String<PATH_CAPACITY>,
    last_body: Vec<u8, BODY_CAPACITY>,
}

impl<H: HttpTransport> ServiceFetcher<H> {
    /// Build the request for the account and zone in `settings`
    pub fn new(http: H, settings: &Settings) -> Result<Self, PathError> {
        let timezone = settings.query_timezone();
        Ok(Self {
            http,
            path: timeservice::request_path(&settings.aio_username, &settings.aio_key, timezone)?,
            redacted: timeservice::redacted_path(timezone)?,
            last_body: Vec::new(),
        })
    }

    /// Request path with credentials masked, safe to log
    pub fn redacted_path(&self) -> &str {
        &self.redacted
    }

    /// Body of the most recent response, for logging rejected replies
    ///
    /// Empty when no body arrived or it was not UTF-8.
    pub fn last_body(&self) -> &str {
        core::str::from_utf8(&self.last_body).unwrap_or("")
    }
}

impl<H: HttpTransport> TimeFetch for ServiceFetcher<H> {
    async fn fetch<D: DelayNs>(&mut self, _delay: &mut D) -> Result<FetchedTime, FetchError> {
        let mut body = [0u8; BODY_CAPACITY];
        self.last_body.clear();
        let reply = self
            .http
            .get(SERVICE_HOST, &self.path, &mut body)
            .await
            .map_err(FetchError::Transport)?;
        let body = &body[..reply.len.min(BODY_CAPACITY)];
        // Fits: both are BODY_CAPACITY long
        let _ = self.last_body.extend_from_slice(body);

        let text = core::str::from_utf8(body);
        if !reply.is_success() {
            // The service flags bad credentials or zones with an error body
            return Err(match text.map(timeservice::parse_response) {
                Ok(Err(ParseError::ServiceError)) => FetchError::Service(ParseError::ServiceError),
                _ => FetchError::Transport(TransportError::Status(reply.status)),
            });
        }
        let text = text.map_err(|_| FetchError::Encoding)?;
        let reply = timeservice::parse_response(text).map_err(FetchError::Service)?;
        let wall = DateTime::try_from(&reply).map_err(FetchError::Time)?;

        Ok(FetchedTime {
            wall,
            utc_offset: reply.utc_offset_seconds(),
            attempts: 1,
        })
    }
}

/// Fetcher for an NTP server
///
/// NTP answers in UTC, so the reported offset is always zero.
pub struct NtpFetcher<N> {
    udp: N,
    server: &'static str,
    max_attempts: u8,
    retry_delay_ms: u32,
}

impl<N: DatagramTransport> NtpFetcher<N> {
    /// Fetcher with the default retry policy
    pub fn new(udp: N, server: &'static str) -> Self {
        Self {
            udp,
            server,
            max_attempts: NTP_MAX_ATTEMPTS,
            retry_delay_ms: NTP_RETRY_DELAY_MS,
        }
    }

    /// Override the retry policy
    pub fn with_retries(mut self, max_attempts: u8, retry_delay_ms: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    pub fn server(&self) -> &str {
        self.server
    }

    async fn exchange_once(&mut self) -> Result<i64, FetchError> {
        let request = ntp::request();
        let mut response = [0u8; NTP_PACKET_SIZE];
        let len = self
            .udp
            .exchange(self.server, NTP_PORT, &request, &mut response)
            .await
            .map_err(FetchError::Transport)?;
        let timestamp = ntp::parse_response(&response[..len]).map_err(FetchError::Ntp)?;
        Ok(timestamp.to_unix_seconds())
    }
}

impl<N: DatagramTransport> TimeFetch for NtpFetcher<N> {
    async fn fetch<D: DelayNs>(&mut self, delay: &mut D) -> Result<FetchedTime, FetchError> {
        let mut attempt = 1;
        loop {
            match self.exchange_once().await {
                Ok(unix) => {
                    let wall = DateTime::from_unix(unix).map_err(FetchError::Time)?;
                    return Ok(FetchedTime {
                        wall,
                        utc_offset: 0,
                        attempts: attempt,
                    });
                }
                Err(e) if attempt >= self.max_attempts => return Err(e),
                Err(_) => {
                    delay.delay_ms(self.retry_delay_ms).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::mock::{MockDelay, MockHttp, MockUdp};
    use embassy_futures::block_on;
    use flipclock_protocol::ntp::NTP_UNIX_OFFSET;
    use std::vec;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.aio_username = String::try_from("alice").unwrap();
        settings.aio_key = String::try_from("secret").unwrap();
        settings
    }

    fn ntp_reply(unix: i64) -> [u8; NTP_PACKET_SIZE] {
        let mut packet = [0u8; NTP_PACKET_SIZE];
        packet[0] = 0x1C;
        packet[1] = 2;
        packet[40..44].copy_from_slice(&((unix + NTP_UNIX_OFFSET) as u32).to_be_bytes());
        packet
    }

    #[test]
    fn test_service_fetch() {
        let http = MockHttp::new(vec![Ok(b"2022-09-21 14:11:05.843 264 3 +0100 WEST".to_vec())]);
        let mut fetcher = ServiceFetcher::new(http, &settings()).unwrap();
        let fetched = block_on(fetcher.fetch(&mut MockDelay::new())).unwrap();

        assert_eq!(fetched.wall, DateTime::new(2022, 9, 21, 14, 11, 6).unwrap());
        assert_eq!(fetched.utc_offset, 3600);
        assert!(fetcher.http.paths[0].contains("x-aio-key=secret&tz=Etc/GMT&"));
        assert!(!fetcher.redacted_path().contains("secret"));
    }

    #[test]
    fn test_service_errors_classified() {
        let http = MockHttp::new(vec![
            Err(TransportError::Connect),
            Ok(b"{\"error\":\"not authorized\"}".to_vec()),
            Ok(vec![0xFF, 0xFE]),
        ])
        .then(503, b"Service Unavailable");
        let mut fetcher = ServiceFetcher::new(http, &settings()).unwrap();
        let mut delay = MockDelay::new();

        let err = block_on(fetcher.fetch(&mut delay)).unwrap_err();
        assert_eq!(err, FetchError::Transport(TransportError::Connect));
        assert!(err.is_transport());

        let err = block_on(fetcher.fetch(&mut delay)).unwrap_err();
        assert_eq!(err, FetchError::Service(ParseError::ServiceError));
        assert!(!err.is_transport());
        assert_eq!(fetcher.last_body(), "{\"error\":\"not authorized\"}");

        let err = block_on(fetcher.fetch(&mut delay)).unwrap_err();
        assert_eq!(err, FetchError::Encoding);

        let err = block_on(fetcher.fetch(&mut delay)).unwrap_err();
        assert_eq!(err, FetchError::Transport(TransportError::Status(503)));
        assert!(!err.is_transport());
        assert_eq!(fetcher.last_body(), "Service Unavailable");
    }

    #[test]
    fn test_error_body_with_error_status_is_kept() {
        let body = b"{\"error\":\"invalid API key provided!\"}";
        let http = MockHttp::new(vec![]).then(401, body);
        let mut fetcher = ServiceFetcher::new(http, &settings()).unwrap();

        let err = block_on(fetcher.fetch(&mut MockDelay::new())).unwrap_err();
        assert_eq!(err, FetchError::Service(ParseError::ServiceError));
        assert!(!err.is_transport());
        assert_eq!(fetcher.last_body().as_bytes(), body);
    }

    #[test]
    fn test_last_body_cleared_on_transport_error() {
        let http = MockHttp::new(vec![
            Ok(b"{\"error\":\"throttled\"}".to_vec()),
            Err(TransportError::Timeout),
        ]);
        let mut fetcher = ServiceFetcher::new(http, &settings()).unwrap();
        let mut delay = MockDelay::new();

        assert!(block_on(fetcher.fetch(&mut delay)).is_err());
        assert!(!fetcher.last_body().is_empty());
        assert!(block_on(fetcher.fetch(&mut delay)).is_err());
        assert_eq!(fetcher.last_body(), "");
    }

    #[test]
    fn test_ntp_fetch_retries_then_succeeds() {
        let udp = MockUdp::new(vec![
            Err(TransportError::Timeout),
            Ok([0u8; NTP_PACKET_SIZE].to_vec()),
            Ok(ntp_reply(1_663_715_508).to_vec()),
        ]);
        let mut fetcher = NtpFetcher::new(udp, "pool.ntp.org");
        let mut delay = MockDelay::new();
        let fetched = block_on(fetcher.fetch(&mut delay)).unwrap();

        assert_eq!(fetched.wall, DateTime::new(2022, 9, 20, 23, 11, 48).unwrap());
        assert_eq!(fetched.utc_offset, 0);
        assert_eq!(fetched.attempts, 3);
        assert_eq!(delay.calls, vec![5_000, 5_000]);
    }

    #[test]
    fn test_ntp_fetch_gives_up_after_max_attempts() {
        let udp = MockUdp::new(vec![Err(TransportError::Timeout); 10]);
        let mut fetcher = NtpFetcher::new(udp, "pool.ntp.org");
        let mut delay = MockDelay::new();
        let err = block_on(fetcher.fetch(&mut delay)).unwrap_err();

        assert_eq!(err, FetchError::Transport(TransportError::Timeout));
        assert_eq!(fetcher.udp.requests, 10);
        // No pause after the final attempt
        assert_eq!(delay.calls.len(), 9);
    }

    #[test]
    fn test_ntp_custom_retry_policy() {
        let udp = MockUdp::new(vec![Err(TransportError::Dns); 2]);
        let mut fetcher = NtpFetcher::new(udp, "time.example").with_retries(2, 100);
        let mut delay = MockDelay::new();

        assert!(block_on(fetcher.fetch(&mut delay)).is_err());
        assert_eq!(delay.calls, vec![100]);
        assert_eq!(fetcher.server(), "time.example");
    }
}
