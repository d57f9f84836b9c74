//! HTTP over an `embassy-net` TCP socket
//!
//! One connection per request. The whole response is read until the
//! server closes, then the protocol crate strips the framing.

use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpAddress, Stack};
use embassy_time::Duration;
use embedded_io_async::Write;
use flipclock_hal::{HttpReply, HttpTransport, TransportError};
use flipclock_protocol::{extract_body, write_get_request, HttpError};

/// Plain HTTP port
pub const HTTP_PORT: u16 = 80;

/// Socket inactivity timeout
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(10);

/// Request buffer size
pub const REQUEST_CAPACITY: usize = 512;

/// Raw response buffer size, headers included
pub const RESPONSE_CAPACITY: usize = 2048;

/// Best-effort HTTP client on the network stack
pub struct TcpHttp<'d> {
    stack: Stack<'d>,
}

impl<'d> TcpHttp<'d> {
    pub fn new(stack: Stack<'d>) -> Self {
        Self { stack }
    }
}

/// Resolve `host` to its first IPv4 address
pub(crate) async fn resolve(stack: Stack<'_>, host: &str) -> Result<IpAddress, TransportError> {
    if !stack.is_config_up() {
        return Err(TransportError::NotConnected);
    }
    let addrs = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| TransportError::Dns)?;
    addrs.first().copied().ok_or(TransportError::Dns)
}

impl HttpTransport for TcpHttp<'_> {
    async fn get(
        &mut self,
        host: &str,
        path: &str,
        body: &mut [u8],
    ) -> Result<HttpReply, TransportError> {
        let addr = resolve(self.stack, host).await?;

        let mut request = [0u8; REQUEST_CAPACITY];
        let request_len =
            write_get_request(host, path, &mut request).map_err(|_| TransportError::BufferTooSmall)?;

        let mut rx_buffer = [0u8; 1024];
        let mut tx_buffer = [0u8; REQUEST_CAPACITY];
        let mut socket = TcpSocket::new(self.stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(SOCKET_TIMEOUT));

        socket
            .connect((addr, HTTP_PORT))
            .await
            .map_err(|_| TransportError::Connect)?;
        socket
            .write_all(&request[..request_len])
            .await
            .map_err(|_| TransportError::Io)?;

        let mut response = [0u8; RESPONSE_CAPACITY];
        let mut filled = 0;
        loop {
            if filled == response.len() {
                socket.abort();
                return Err(TransportError::BufferTooSmall);
            }
            match socket.read(&mut response[filled..]).await {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(_) => return Err(TransportError::Io),
            }
        }
        socket.close();

        let head = extract_body(&mut response, filled).map_err(|e| match e {
            HttpError::Incomplete => TransportError::Io,
            _ => TransportError::Malformed,
        })?;
        // Error bodies are only logged, so a truncated one is still useful
        if head.is_success() && head.body_len > body.len() {
            return Err(TransportError::BufferTooSmall);
        }
        let len = head.body_len.min(body.len());
        body[..len].copy_from_slice(&response[..len]);
        Ok(HttpReply {
            status: head.status,
            len,
        })
    }
}
