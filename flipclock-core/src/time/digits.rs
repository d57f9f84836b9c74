//! Two-digit display values

/// Errors formatting or validating a digit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FormatError {
    /// Value does not fit in two decimal digits
    OutOfRange(u8),
    /// Text is not exactly two ASCII digits
    NotTwoDigits,
}

/// A zero-padded two-digit decimal value, e.g. `"09"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitPair([u8; 2]);

impl DigitPair {
    /// Format a value in 0..=99
    pub fn new(value: u8) -> Result<Self, FormatError> {
        if value > 99 {
            return Err(FormatError::OutOfRange(value));
        }
        Ok(Self([b'0' + value / 10, b'0' + value % 10]))
    }

    /// Validate text as a digit pair
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        match text.as_bytes() {
            &[tens, ones] if tens.is_ascii_digit() && ones.is_ascii_digit() => {
                Ok(Self([tens, ones]))
            }
            _ => Err(FormatError::NotTwoDigits),
        }
    }

    /// Numeric value
    pub fn value(&self) -> u8 {
        (self.0[0] - b'0') * 10 + (self.0[1] - b'0')
    }

    /// Tens and ones digits
    pub fn digits(&self) -> [u8; 2] {
        [self.0[0] - b'0', self.0[1] - b'0']
    }

    pub fn as_str(&self) -> &str {
        // Always two ASCII digits
        core::str::from_utf8(&self.0).unwrap_or("00")
    }
}
