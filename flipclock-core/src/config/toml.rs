//! Settings file parser
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! the settings file. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - Basic strings with `\\`, `\"`, `\n`, `\r` and `\t` escapes
//! - Literal strings in single quotes
//! - Comments (# ...)
//!
//! NOT supported:
//! - Tables and arrays
//! - Multi-line strings
//! - Dotted or quoted keys
//!
//! For the two flag-like keys the values used by older settings files are
//! accepted too: `LOCAL_TIME_FLAG = "1"` and `tz_offset = "3600"`.

use heapless::String;

use super::settings::{Key, Settings};

/// Largest accepted timezone offset, in seconds
pub const MAX_TZ_OFFSET: i32 = 14 * 3600;

/// Settings parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Line is not a `key = value` pair (1-based line number)
    Syntax(u16),
    /// Key appears more than once
    DuplicateKey(Key),
    /// Required key is absent
    MissingKey(Key),
    /// Value has the wrong type or is out of range
    InvalidValue(Key),
    /// String value exceeds its capacity
    TooLong(Key),
}

/// Keys that must be present
const REQUIRED: [Key; 2] = [Key::Ssid, Key::Password];

/// Parse a settings file
///
/// Unknown keys are ignored. Missing optional keys keep their defaults,
/// which mean "no local-time adjustment".
pub fn parse_settings(input: &str) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();
    let mut seen = [false; Key::ALL.len()];

    for (index, line) in input.lines().enumerate() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line_number = u16::try_from(index + 1).unwrap_or(u16::MAX);
        let (name, value) =
            parse_key_value(line).ok_or(SettingsError::Syntax(line_number))?;

        let Some(key) = Key::from_name(name) else {
            continue;
        };
        if seen[key as usize] {
            return Err(SettingsError::DuplicateKey(key));
        }
        seen[key as usize] = true;

        apply_value(&mut settings, key, value)?;
    }

    for key in REQUIRED {
        if !seen[key as usize] {
            return Err(SettingsError::MissingKey(key));
        }
    }

    Ok(settings)
}

fn apply_value(settings: &mut Settings, key: Key, value: &str) -> Result<(), SettingsError> {
    match key {
        Key::Ssid => settings.ssid = parse_string(key, value)?,
        Key::Password => settings.password = parse_string(key, value)?,
        Key::AioUsername => settings.aio_username = parse_string(key, value)?,
        Key::AioKey => settings.aio_key = parse_string(key, value)?,
        Key::Timezone => settings.timezone = parse_string(key, value)?,
        Key::LocalTimeFlag => settings.use_local_time = parse_flag(key, value)?,
        Key::TzOffset => {
            let offset = parse_int(key, value)?;
            if !(-MAX_TZ_OFFSET..=MAX_TZ_OFFSET).contains(&offset) {
                return Err(SettingsError::InvalidValue(key));
            }
            settings.tz_offset = offset;
        }
    }
    Ok(())
}

/// Split `key = value`, dropping any trailing comment
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = strip_comment(value).trim();

    let bare = key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if key.is_empty() || !bare || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Cut the value at the first `#` outside a string
fn strip_comment(value: &str) -> &str {
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    for (pos, byte) in value.bytes().enumerate() {
        match quote {
            Some(b'"') if escaped => escaped = false,
            Some(b'"') if byte == b'\\' => escaped = true,
            Some(open) if byte == open => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if byte == b'#' => return &value[..pos],
            None => {}
        }
    }
    value
}

/// Parse a quoted string into a fixed-capacity string
fn parse_string<const N: usize>(key: Key, value: &str) -> Result<String<N>, SettingsError> {
    let invalid = SettingsError::InvalidValue(key);
    let mut out = String::new();

    if let Some(inner) = strip_quotes(value, '\'') {
        if inner.contains('\'') {
            return Err(invalid);
        }
        out.push_str(inner).map_err(|_| SettingsError::TooLong(key))?;
        return Ok(out);
    }

    let inner = strip_quotes(value, '"').ok_or(invalid)?;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        let c = match c {
            '"' => return Err(invalid),
            '\\' => match chars.next() {
                Some('\\') => '\\',
                Some('"') => '"',
                Some('n') => '\n',
                Some('r') => '\r',
                Some('t') => '\t',
                _ => return Err(invalid),
            },
            c => c,
        };
        out.push(c).map_err(|_| SettingsError::TooLong(key))?;
    }
    Ok(out)
}

fn strip_quotes(value: &str, quote: char) -> Option<&str> {
    value.strip_prefix(quote)?.strip_suffix(quote)
}

/// Parse an integer, bare or quoted
fn parse_int(key: Key, value: &str) -> Result<i32, SettingsError> {
    let digits = strip_quotes(value, '"').unwrap_or(value).trim();
    digits.parse().map_err(|_| SettingsError::InvalidValue(key))
}

/// Parse a boolean, or an integer where only 1 means true
fn parse_flag(key: Key, value: &str) -> Result<bool, SettingsError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => parse_int(key, value).map(|flag| flag == 1),
    }
}
