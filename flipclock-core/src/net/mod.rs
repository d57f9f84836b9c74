//! Network bring-up

pub mod backoff;
pub mod bootstrap;

pub use backoff::Backoff;
pub use bootstrap::{connect, ConnectError, JoinFailure};
