//! Minimal HTTP/1.1 client framing
//!
//! Just enough of HTTP/1.1 for a single `GET` over a fresh connection:
//! the request is written with `Connection: close`, the whole response is
//! read into one buffer, and [`extract_body`] moves the body to the front
//! of that buffer. `Content-Length`, chunked and read-until-close bodies
//! are understood. There is no redirect or keep-alive support.

use core::fmt::Write;

/// Errors from HTTP framing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HttpError {
    /// Response ended before the header block or the declared body
    Incomplete,
    /// Status line is not `HTTP/1.x NNN ...`
    BadStatusLine,
    /// A header line has no `:` separator or is not valid UTF-8
    BadHeader,
    /// `Content-Length` is not a decimal number
    BadContentLength,
    /// Chunk size line or chunk terminator is malformed
    BadChunk,
    /// Request does not fit in the output buffer
    BufferTooSmall,
}

/// How the response body is delimited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BodyFraming {
    /// `Content-Length: n`
    Length(usize),
    /// `Transfer-Encoding: chunked`
    Chunked,
    /// Body runs until the server closes the connection
    UntilClose,
}

/// Status and body location of a parsed response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResponseHead {
    /// HTTP status code
    pub status: u16,
    /// Length of the decoded body, which starts at offset 0 of the buffer
    pub body_len: usize,
}

impl ResponseHead {
    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Write a `GET` request for `path` on `host` into `buffer`
///
/// # Returns
/// The number of bytes written.
pub fn write_get_request(host: &str, path: &str, buffer: &mut [u8]) -> Result<usize, HttpError> {
    let mut cursor = Cursor { buffer, len: 0 };
    write!(
        cursor,
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: flipclock/0.1\r\nAccept: text/plain\r\nConnection: close\r\n\r\n",
        path, host
    )
    .map_err(|_| HttpError::BufferTooSmall)?;
    Ok(cursor.len)
}

/// `fmt::Write` adapter over a byte slice
struct Cursor<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl Write for Cursor<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let end = self.len + s.len();
        if end > self.buffer.len() {
            return Err(core::fmt::Error);
        }
        self.buffer[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Parse the response held in `buffer[..len]` and move its body to the front
///
/// After a successful call `buffer[..head.body_len]` holds the decoded
/// body; the header block and any chunk framing are overwritten.
pub fn extract_body(buffer: &mut [u8], len: usize) -> Result<ResponseHead, HttpError> {
    let len = len.min(buffer.len());
    let header_end = find(&buffer[..len], b"\r\n\r\n").ok_or(HttpError::Incomplete)?;
    let body_start = header_end + 4;

    let head = core::str::from_utf8(&buffer[..header_end]).map_err(|_| HttpError::BadHeader)?;
    let mut lines = head.split("\r\n");
    let status = parse_status_line(lines.next().unwrap_or(""))?;

    let mut framing = BodyFraming::UntilClose;
    for line in lines {
        let (name, value) = line.split_once(':').ok_or(HttpError::BadHeader)?;
        let value = value.trim();
        if name.trim().eq_ignore_ascii_case("transfer-encoding") {
            if value
                .split(',')
                .any(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
            {
                framing = BodyFraming::Chunked;
            }
        } else if name.trim().eq_ignore_ascii_case("content-length")
            && framing != BodyFraming::Chunked
        {
            let length = value
                .parse::<usize>()
                .map_err(|_| HttpError::BadContentLength)?;
            framing = BodyFraming::Length(length);
        }
    }

    let body_len = match framing {
        BodyFraming::Length(length) => {
            let end = body_start
                .checked_add(length)
                .ok_or(HttpError::BadContentLength)?;
            if end > len {
                return Err(HttpError::Incomplete);
            }
            buffer.copy_within(body_start..end, 0);
            length
        }
        BodyFraming::UntilClose => {
            buffer.copy_within(body_start..len, 0);
            len - body_start
        }
        BodyFraming::Chunked => dechunk(buffer, body_start, len)?,
    };

    Ok(ResponseHead { status, body_len })
}

fn parse_status_line(line: &str) -> Result<u16, HttpError> {
    let mut parts = line.splitn(3, ' ');
    let version = parts.next().unwrap_or("");
    if !version.starts_with("HTTP/1.") {
        return Err(HttpError::BadStatusLine);
    }
    let code = parts.next().unwrap_or("");
    if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(HttpError::BadStatusLine);
    }
    code.parse().map_err(|_| HttpError::BadStatusLine)
}

/// Decode a chunked body in place, writing the payload from offset 0
///
/// The write position always trails the read position by at least the
/// header block, so chunks can be moved with `copy_within`.
fn dechunk(buffer: &mut [u8], mut pos: usize, len: usize) -> Result<usize, HttpError> {
    let mut out = 0;
    loop {
        let line_len = find(&buffer[pos..len], b"\r\n").ok_or(HttpError::Incomplete)?;
        let size = parse_chunk_size(&buffer[pos..pos + line_len])?;
        pos += line_len + 2;

        if size == 0 {
            // Trailers, if any, are ignored
            return Ok(out);
        }

        let end = pos.checked_add(size).ok_or(HttpError::BadChunk)?;
        if end + 2 > len {
            return Err(HttpError::Incomplete);
        }
        if &buffer[end..end + 2] != b"\r\n" {
            return Err(HttpError::BadChunk);
        }
        buffer.copy_within(pos..end, out);
        out += size;
        pos = end + 2;
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<usize, HttpError> {
    // Chunk extensions follow a ';'
    let digits = line.split(|&b| b == b';').next().unwrap_or(&[]);
    let digits = core::str::from_utf8(digits).map_err(|_| HttpError::BadChunk)?;
    let digits = digits.trim();
    if digits.is_empty() {
        return Err(HttpError::BadChunk);
    }
    usize::from_str_radix(digits, 16).map_err(|_| HttpError::BadChunk)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(buffer: &mut [u8], response: &[u8]) -> usize {
        buffer[..response.len()].copy_from_slice(response);
        response.len()
    }

    #[test]
    fn test_write_get_request() {
        let mut buffer = [0u8; 256];
        let len = write_get_request("io.adafruit.com", "/api/v2/x", &mut buffer).unwrap();
        let request = core::str::from_utf8(&buffer[..len]).unwrap();

        assert!(request.starts_with("GET /api/v2/x HTTP/1.1\r\nHost: io.adafruit.com\r\n"));
        assert!(request.contains("Connection: close\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_write_get_request_buffer_too_small() {
        let mut buffer = [0u8; 16];
        assert_eq!(
            write_get_request("io.adafruit.com", "/", &mut buffer),
            Err(HttpError::BufferTooSmall)
        );
    }

    #[test]
    fn test_content_length_body() {
        let mut buffer = [0u8; 256];
        let len = load(
            &mut buffer,
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello",
        );
        let head = extract_body(&mut buffer, len).unwrap();

        assert_eq!(head.status, 200);
        assert!(head.is_success());
        assert_eq!(&buffer[..head.body_len], b"hello");
    }

    #[test]
    fn test_error_status_keeps_body() {
        let mut buffer = [0u8; 256];
        let len = load(
            &mut buffer,
            b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 37\r\n\r\n{\"error\":\"invalid API key provided!\"}",
        );
        let head = extract_body(&mut buffer, len).unwrap();

        assert_eq!(head.status, 401);
        assert!(!head.is_success());
        assert_eq!(
            &buffer[..head.body_len],
            b"{\"error\":\"invalid API key provided!\"}"
        );
    }

    #[test]
    fn test_content_length_truncated() {
        let mut buffer = [0u8; 256];
        let len = load(
            &mut buffer,
            b"HTTP/1.1 200 OK\r\nContent-Length: 50\r\n\r\nhello",
        );
        assert_eq!(extract_body(&mut buffer, len), Err(HttpError::Incomplete));
    }

    #[test]
    fn test_chunked_body() {
        let mut buffer = [0u8; 256];
        let len = load(
            &mut buffer,
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
              7\r\n2022-09\r\n8;ext=1\r\n-20 23:1\r\n0\r\n\r\n",
        );
        let head = extract_body(&mut buffer, len).unwrap();

        assert_eq!(&buffer[..head.body_len], b"2022-09-20 23:1");
    }

    #[test]
    fn test_chunked_overrides_content_length() {
        let mut buffer = [0u8; 256];
        let len = load(
            &mut buffer,
            b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\nContent-Length: 99\r\n\r\n\
              2\r\nok\r\n0\r\n\r\n",
        );
        let head = extract_body(&mut buffer, len).unwrap();
        assert_eq!(&buffer[..head.body_len], b"ok");
    }

    #[test]
    fn test_bad_chunk() {
        let mut buffer = [0u8; 256];
        let len = load(
            &mut buffer,
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nzz\r\nok\r\n0\r\n\r\n",
        );
        assert_eq!(extract_body(&mut buffer, len), Err(HttpError::BadChunk));
    }

    #[test]
    fn test_body_until_close() {
        let mut buffer = [0u8; 256];
        let len = load(&mut buffer, b"HTTP/1.0 404 Not Found\r\nServer: x\r\n\r\nnope");
        let head = extract_body(&mut buffer, len).unwrap();

        assert_eq!(head.status, 404);
        assert!(!head.is_success());
        assert_eq!(&buffer[..head.body_len], b"nope");
    }

    #[test]
    fn test_bad_status_line() {
        let mut buffer = [0u8; 64];
        let len = load(&mut buffer, b"ICY 200 OK\r\n\r\n");
        assert_eq!(extract_body(&mut buffer, len), Err(HttpError::BadStatusLine));
    }

    #[test]
    fn test_missing_header_terminator() {
        let mut buffer = [0u8; 64];
        let len = load(&mut buffer, b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n");
        assert_eq!(extract_body(&mut buffer, len), Err(HttpError::Incomplete));
    }
}
