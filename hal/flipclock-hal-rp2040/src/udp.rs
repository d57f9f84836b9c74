//! Single request/response UDP exchange, used for NTP

use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use flipclock_hal::{DatagramTransport, TransportError};

use crate::http::resolve;

/// Time to wait for the reply
pub const REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// Datagram transport on the network stack
pub struct UdpExchange<'d> {
    stack: Stack<'d>,
}

impl<'d> UdpExchange<'d> {
    pub fn new(stack: Stack<'d>) -> Self {
        Self { stack }
    }
}

impl DatagramTransport for UdpExchange<'_> {
    async fn exchange(
        &mut self,
        host: &str,
        port: u16,
        request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, TransportError> {
        let addr = resolve(self.stack, host).await?;

        let mut rx_meta = [PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0u8; 128];
        let mut tx_meta = [PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0u8; 128];
        let mut socket = UdpSocket::new(
            self.stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| TransportError::Connect)?;

        socket
            .send_to(request, (addr, port))
            .await
            .map_err(|_| TransportError::Io)?;

        let (len, _) = with_timeout(REPLY_TIMEOUT, socket.recv_from(response))
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|_| TransportError::Io)?;
        Ok(len)
    }
}
