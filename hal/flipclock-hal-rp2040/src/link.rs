//! CYW43 wireless link
//!
//! Joins an access point through the radio's control handle, then waits
//! for the network stack to come up with a DHCP lease.

use cyw43::{Control, JoinOptions};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use flipclock_hal::{LinkError, WifiLink};

/// Time allowed for the link and the DHCP lease after a join
pub const CONFIG_TIMEOUT: Duration = Duration::from_secs(15);

/// CYW43 station link
pub struct CywLink<'d> {
    control: Control<'d>,
    stack: Stack<'d>,
}

impl<'d> CywLink<'d> {
    pub fn new(control: Control<'d>, stack: Stack<'d>) -> Self {
        Self { control, stack }
    }

    pub fn stack(&self) -> Stack<'d> {
        self.stack
    }
}

impl WifiLink for CywLink<'_> {
    async fn join(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        self.control
            .join(ssid, JoinOptions::new(password.as_bytes()))
            .await
            .map_err(|e| LinkError::JoinFailed(e.status))?;

        with_timeout(CONFIG_TIMEOUT, self.stack.wait_link_up())
            .await
            .map_err(|_| LinkError::Timeout)?;
        with_timeout(CONFIG_TIMEOUT, self.stack.wait_config_up())
            .await
            .map_err(|_| LinkError::NoAddress)?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stack.is_link_up() && self.stack.is_config_up()
    }
}
