//! Network abstractions
//!
//! Provides traits for the radio link and the two transports the time
//! source needs: an HTTP GET for the formatted-string time service and a
//! single UDP exchange for NTP.

/// Errors from wireless association
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The access point rejected or did not answer the join request
    ///
    /// Carries the radio driver's status code.
    JoinFailed(u32),
    /// Associated, but no IP configuration arrived
    NoAddress,
    /// Association did not complete in time
    Timeout,
}

/// Errors from a network transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Link is down
    NotConnected,
    /// Host name could not be resolved
    Dns,
    /// Connection could not be established
    Connect,
    /// Read or write on an established connection failed
    Io,
    /// Peer did not answer in time
    Timeout,
    /// Response did not fit in the provided buffer
    BufferTooSmall,
    /// Response framing was invalid
    Malformed,
    /// Server answered with a non-success HTTP status
    Status(u16),
}

/// Status and body length of an HTTP response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HttpReply {
    pub status: u16,
    /// Body bytes copied into the caller's buffer
    pub len: usize,
}

impl HttpReply {
    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Wireless network link
pub trait WifiLink {
    /// Associate with an access point and wait for an IP configuration
    fn join(
        &mut self,
        ssid: &str,
        password: &str,
    ) -> impl core::future::Future<Output = Result<(), LinkError>>;

    /// Check whether the link is up and configured
    fn is_connected(&self) -> bool;
}

/// Best-effort HTTP client
///
/// One request per call; no redirects, no keep-alive.
pub trait HttpTransport {
    /// Issue `GET path` against `host` and copy the response body into `body`
    ///
    /// Any status is returned as a reply, so error bodies reach the caller.
    /// A success body that does not fit is [`TransportError::BufferTooSmall`];
    /// other bodies are truncated to `body.len()`.
    fn get(
        &mut self,
        host: &str,
        path: &str,
        body: &mut [u8],
    ) -> impl core::future::Future<Output = Result<HttpReply, TransportError>>;
}

/// Request/response datagram exchange
pub trait DatagramTransport {
    /// Send `request` to `host:port` and wait for one reply
    ///
    /// # Returns
    /// The number of bytes written into `response`.
    fn exchange(
        &mut self,
        host: &str,
        port: u16,
        request: &[u8],
        response: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, TransportError>>;
}
