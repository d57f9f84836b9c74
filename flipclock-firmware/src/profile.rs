//! Time source profile, selected at build time
//!
//! `time-service` queries the formatted-string HTTP time service every
//! two minutes. `ntp` asks an NTP pool every ten minutes.

use defmt::*;
use embassy_net::Stack;

use flipclock_core::config::Settings;

#[cfg(all(feature = "time-service", feature = "ntp"))]
compile_error!("enable only one of the `time-service` and `ntp` features");

#[cfg(not(any(feature = "time-service", feature = "ntp")))]
compile_error!("enable one of the `time-service` or `ntp` features");

#[cfg(feature = "time-service")]
mod selected {
    use super::*;
    use flipclock_core::refresh::SERVICE_SYNC_INTERVAL_MS;
    use flipclock_core::sync::ServiceFetcher;
    use flipclock_hal_rp2040::TcpHttp;

    pub const NAME: &str = "time service";
    pub const SYNC_INTERVAL_MS: u64 = SERVICE_SYNC_INTERVAL_MS;

    pub type Fetcher = ServiceFetcher<TcpHttp<'static>>;

    /// Build the HTTP fetcher; missing credentials are fatal
    pub fn fetcher(stack: Stack<'static>, settings: &Settings) -> Fetcher {
        if !settings.has_service_credentials() {
            defmt::panic!("aio_username and aio_key are required for the time service");
        }
        match ServiceFetcher::new(TcpHttp::new(stack), settings) {
            Ok(fetcher) => {
                info!("Time service request: {}", fetcher.redacted_path());
                fetcher
            }
            Err(e) => defmt::panic!("Time service request does not fit: {}", e),
        }
    }
}

#[cfg(feature = "ntp")]
mod selected {
    use super::*;
    use flipclock_core::refresh::NTP_SYNC_INTERVAL_MS;
    use flipclock_core::sync::NtpFetcher;
    use flipclock_hal_rp2040::UdpExchange;
    use flipclock_protocol::ntp::DEFAULT_SERVER;

    pub const NAME: &str = "NTP";
    pub const SYNC_INTERVAL_MS: u64 = NTP_SYNC_INTERVAL_MS;

    pub type Fetcher = NtpFetcher<UdpExchange<'static>>;

    pub fn fetcher(stack: Stack<'static>, _settings: &Settings) -> Fetcher {
        info!("NTP server: {}", DEFAULT_SERVER);
        NtpFetcher::new(UdpExchange::new(stack), DEFAULT_SERVER)
    }
}

pub use selected::{fetcher, Fetcher, NAME, SYNC_INTERVAL_MS};
