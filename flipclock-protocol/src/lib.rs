//! Flipclock time synchronisation wire formats
//!
//! This crate holds everything that touches bytes on the network, with no
//! I/O of its own. The transports in the board HAL move the bytes; the
//! clock logic in `flipclock-core` consumes the typed results.
//!
//! # Protocol Overview
//!
//! Two interchangeable time sources are supported:
//!
//! ```text
//! time service (TCP/80)                 NTP (UDP/123)
//! ┌──────────────────────────┐          ┌──────────────────────────┐
//! │ GET /api/v2/.../strftime │          │ 48-byte client request   │
//! │ HTTP/1.1 response        │          │ 48-byte server response  │
//! │ "2022-09-20 23:11:48.347 │          │ transmit timestamp       │
//! │  263 2 +0000 UTC"        │          │ (seconds since 1900)     │
//! └──────────────────────────┘          └──────────────────────────┘
//! ```
//!
//! - [`timeservice`] builds the request path and strictly parses the
//!   formatted-string body
//! - [`http`] writes the GET request and extracts the body from the raw
//!   HTTP/1.1 response
//! - [`ntp`] builds the SNTP request and validates the reply

#![no_std]
#![deny(unsafe_code)]

pub mod http;
pub mod ntp;
pub mod timeservice;

pub use http::{extract_body, write_get_request, HttpError, ResponseHead};
pub use ntp::{NtpError, NtpTimestamp, NTP_PACKET_SIZE, NTP_PORT};
pub use timeservice::{Field, ParseError, PathError, ServiceTime, SERVICE_HOST};
