//! SNTP client packets
//!
//! Packet layout (first word):
//! - LI (2 bits): leap indicator, 3 = clock unsynchronised
//! - VN (3 bits): version, 3
//! - Mode (3 bits): 3 = client, 4 = server
//! - Stratum (1 byte): 0 = kiss-of-death
//!
//! Only the transmit timestamp (bytes 40..48) is used. Timestamps count
//! seconds since 1900-01-01 with a 32-bit fraction.

/// Size of an NTP packet without extensions
pub const NTP_PACKET_SIZE: usize = 48;

/// Well-known NTP port
pub const NTP_PORT: u16 = 123;

/// Default server pool
pub const DEFAULT_SERVER: &str = "pool.ntp.org";

/// Seconds between the NTP epoch (1900) and the Unix epoch (1970)
pub const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// LI = 0, VN = 3, Mode = 3 (client)
const CLIENT_HEADER: u8 = 0x1B;

const MODE_SERVER: u8 = 4;
const LEAP_UNSYNCHRONIZED: u8 = 3;
const TRANSMIT_OFFSET: usize = 40;

/// Errors validating a server response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NtpError {
    /// Fewer than [`NTP_PACKET_SIZE`] bytes
    TooShort,
    /// Mode field is not "server"
    NotServerMode,
    /// Stratum 0: the server refused service
    KissOfDeath,
    /// Leap indicator says the server clock is not synchronised
    Unsynchronized,
    /// Transmit timestamp is zero
    ZeroTimestamp,
}

/// 64-bit NTP timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NtpTimestamp {
    /// Seconds since 1900-01-01 (modulo 2^32)
    pub seconds: u32,
    /// Fractional second in units of 2^-32 s
    pub fraction: u32,
}

impl NtpTimestamp {
    /// Convert to Unix seconds, rounding the fraction half-up
    ///
    /// Timestamps with the top bit clear are taken to be in era 1
    /// (from 2036-02-07), so the conversion stays correct past the
    /// 32-bit rollover.
    pub fn to_unix_seconds(&self) -> i64 {
        let mut seconds = i64::from(self.seconds);
        if self.seconds & 0x8000_0000 == 0 {
            seconds += 1 << 32;
        }
        let round_up = self.fraction >= 0x8000_0000;
        seconds - NTP_UNIX_OFFSET + i64::from(round_up)
    }

    /// Fractional second in milliseconds
    pub fn millis(&self) -> u16 {
        ((u64::from(self.fraction) * 1000) >> 32) as u16
    }
}

/// Build a client request
pub fn request() -> [u8; NTP_PACKET_SIZE] {
    let mut packet = [0u8; NTP_PACKET_SIZE];
    packet[0] = CLIENT_HEADER;
    packet
}

/// Validate a server response and extract its transmit timestamp
pub fn parse_response(packet: &[u8]) -> Result<NtpTimestamp, NtpError> {
    if packet.len() < NTP_PACKET_SIZE {
        return Err(NtpError::TooShort);
    }

    let leap = packet[0] >> 6;
    let mode = packet[0] & 0x07;
    let stratum = packet[1];

    if mode != MODE_SERVER {
        return Err(NtpError::NotServerMode);
    }
    if stratum == 0 {
        return Err(NtpError::KissOfDeath);
    }
    if leap == LEAP_UNSYNCHRONIZED {
        return Err(NtpError::Unsynchronized);
    }

    let seconds = read_u32(packet, TRANSMIT_OFFSET);
    let fraction = read_u32(packet, TRANSMIT_OFFSET + 4);
    if seconds == 0 && fraction == 0 {
        return Err(NtpError::ZeroTimestamp);
    }

    Ok(NtpTimestamp { seconds, fraction })
}

fn read_u32(packet: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        packet[offset],
        packet[offset + 1],
        packet[offset + 2],
        packet[offset + 3],
    ])
}
