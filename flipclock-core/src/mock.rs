//! In-memory doubles for the hardware traits, shared by the unit tests

extern crate std;

use std::collections::VecDeque;
use std::string::String;
use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;
use flipclock_hal::{
    DatagramTransport, HttpReply, HttpTransport, LinkError, RealTimeClock, RtcError, RtcTime,
    TransportError, WifiLink,
};

use crate::sync::{FetchError, FetchedTime, TimeFetch};
use crate::time::DateTime;
use crate::traits::{ClockFace, FaceError};

/// Records every requested pause in milliseconds
#[derive(Default)]
pub struct MockDelay {
    pub calls: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ms(&self) -> u64 {
        self.calls.iter().map(|&ms| u64::from(ms)).sum()
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls.push(ns / 1_000_000);
    }

    async fn delay_ms(&mut self, ms: u32) {
        self.calls.push(ms);
    }
}

/// Clock holding a single record; no time passes unless a test sets it
#[derive(Default)]
pub struct MockRtc {
    pub time: Option<RtcTime>,
    pub sets: Vec<RtcTime>,
    pub fail_reads: bool,
    pub fail_sets: bool,
}

impl MockRtc {
    pub fn at(time: DateTime) -> Self {
        Self {
            time: Some(time.into()),
            ..Self::default()
        }
    }

    pub fn stopped() -> Self {
        Self::default()
    }
}

impl RealTimeClock for MockRtc {
    fn now(&mut self) -> Result<RtcTime, RtcError> {
        if self.fail_reads {
            return Err(RtcError::Bus);
        }
        self.time.ok_or(RtcError::NotRunning)
    }

    fn set(&mut self, time: &RtcTime) -> Result<(), RtcError> {
        if self.fail_sets {
            return Err(RtcError::Bus);
        }
        self.sets.push(*time);
        self.time = Some(*time);
        Ok(())
    }
}

/// Which face field a write went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pair {
    First,
    Second,
}

/// Face that records writes instead of drawing
#[derive(Default)]
pub struct MockFace {
    pub first: String,
    pub second: String,
    pub writes: Vec<(Pair, String)>,
    pub fail_with: Option<FaceError>,
}

impl MockFace {
    fn write(&mut self, pair: Pair, value: &str) -> Result<(), FaceError> {
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FaceError::InvalidPair);
        }
        self.writes.push((pair, String::from(value)));
        match pair {
            Pair::First => self.first = String::from(value),
            Pair::Second => self.second = String::from(value),
        }
        Ok(())
    }
}

impl ClockFace for MockFace {
    async fn set_first_pair(&mut self, pair: &str) -> Result<(), FaceError> {
        self.write(Pair::First, pair)
    }

    async fn set_second_pair(&mut self, pair: &str) -> Result<(), FaceError> {
        self.write(Pair::Second, pair)
    }

    fn first_pair(&self) -> &str {
        &self.first
    }

    fn second_pair(&self) -> &str {
        &self.second
    }
}

/// HTTP transport replaying canned bodies
pub struct MockHttp {
    /// Status and body per request
    pub replies: VecDeque<Result<(u16, Vec<u8>), TransportError>>,
    pub paths: Vec<String>,
}

impl MockHttp {
    /// Replies served with status 200
    pub fn new(replies: Vec<Result<Vec<u8>, TransportError>>) -> Self {
        Self {
            replies: replies
                .into_iter()
                .map(|reply| reply.map(|body| (200, body)))
                .collect(),
            paths: Vec::new(),
        }
    }

    /// Queue a reply with an explicit status
    pub fn then(mut self, status: u16, body: &[u8]) -> Self {
        self.replies.push_back(Ok((status, body.to_vec())));
        self
    }
}

impl HttpTransport for MockHttp {
    async fn get(
        &mut self,
        _host: &str,
        path: &str,
        body: &mut [u8],
    ) -> Result<HttpReply, TransportError> {
        self.paths.push(String::from(path));
        let (status, reply) = self
            .replies
            .pop_front()
            .unwrap_or(Err(TransportError::NotConnected))?;
        if (200..300).contains(&status) && reply.len() > body.len() {
            return Err(TransportError::BufferTooSmall);
        }
        let len = reply.len().min(body.len());
        body[..len].copy_from_slice(&reply[..len]);
        Ok(HttpReply { status, len })
    }
}

/// Datagram transport replaying canned packets
pub struct MockUdp {
    pub replies: VecDeque<Result<Vec<u8>, TransportError>>,
    pub requests: usize,
}

impl MockUdp {
    pub fn new(replies: Vec<Result<Vec<u8>, TransportError>>) -> Self {
        Self {
            replies: replies.into(),
            requests: 0,
        }
    }
}

impl DatagramTransport for MockUdp {
    async fn exchange(
        &mut self,
        _host: &str,
        _port: u16,
        _request: &[u8],
        response: &mut [u8],
    ) -> Result<usize, TransportError> {
        self.requests += 1;
        let reply = self
            .replies
            .pop_front()
            .unwrap_or(Err(TransportError::Timeout))?;
        let len = reply.len().min(response.len());
        response[..len].copy_from_slice(&reply[..len]);
        Ok(len)
    }
}

/// Link that fails a fixed number of joins before succeeding
pub struct MockLink {
    pub failures: u8,
    pub joins: u8,
    pub connected: bool,
}

impl MockLink {
    pub fn failing(failures: u8) -> Self {
        Self {
            failures,
            joins: 0,
            connected: false,
        }
    }
}

impl WifiLink for MockLink {
    async fn join(&mut self, _ssid: &str, _password: &str) -> Result<(), LinkError> {
        self.joins += 1;
        if self.joins <= self.failures {
            return Err(LinkError::JoinFailed(self.joins.into()));
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

/// Fetcher replaying canned results
pub struct MockFetch {
    pub results: VecDeque<Result<FetchedTime, FetchError>>,
    pub calls: usize,
}

impl MockFetch {
    pub fn new(results: Vec<Result<FetchedTime, FetchError>>) -> Self {
        Self {
            results: results.into(),
            calls: 0,
        }
    }

    /// A fetch reporting `wall` at `utc_offset`
    pub fn reply(wall: DateTime, utc_offset: i32) -> Result<FetchedTime, FetchError> {
        Ok(FetchedTime {
            wall,
            utc_offset,
            attempts: 1,
        })
    }
}

impl TimeFetch for MockFetch {
    async fn fetch<D: DelayNs>(&mut self, _delay: &mut D) -> Result<FetchedTime, FetchError> {
        self.calls += 1;
        self.results
            .pop_front()
            .unwrap_or(Err(FetchError::Transport(TransportError::NotConnected)))
    }
}
