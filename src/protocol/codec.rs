//! Protocol codec
//!
//! Encoding of commands and primitive decoding of replies.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! *<n>\r\n
//! $<len>\r\n<len bytes>\r\n      (n times: keyword, then arguments)
//! ```
//!
//! ### Reply Format
//! ```text
//! +<line>\r\n                    status
//! -<line>\r\n                    error
//! :<integer>\r\n                 integer
//! $<len>\r\n<len bytes>\r\n      bulk string ($-1\r\n = null)
//! *<count>\r\n<count replies>    array (*-1\r\n = null)
//! ```
//!
//! A reply is always read to its last byte before this module returns it.
//! When that is impossible (early EOF, malformed length, unknown type byte)
//! the error is fatal to the stream: there is no marker to resynchronize on.

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::BufMut;

use crate::config::{Config, DEFAULT_MAX_ARRAY_LEN, DEFAULT_MAX_BULK_LEN};
use crate::error::{KvError, Result};
use super::Command;

/// Line terminator
pub const CRLF: &[u8] = b"\r\n";

/// Longest single reply line accepted, terminator included
pub const MAX_LINE_LEN: usize = 1024 * 1024;

/// Deepest array nesting accepted
pub const MAX_NESTING_DEPTH: usize = 32;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut message = Vec::with_capacity(command.encoded_len());
    encode_command_into(command, &mut message);
    message
}

/// Append the encoded command to any byte sink
pub fn encode_command_into<B: BufMut>(command: &Command, buf: &mut B) {
    put_header(buf, b'*', command.len());
    for part in command.parts() {
        put_header(buf, b'$', part.len());
        buf.put_slice(part);
        buf.put_slice(CRLF);
    }
}

fn put_header<B: BufMut>(buf: &mut B, sigil: u8, n: usize) {
    buf.put_u8(sigil);
    buf.put_slice(n.to_string().as_bytes());
    buf.put_slice(CRLF);
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Reply Frames
// =============================================================================

/// Upper bounds applied to lengths declared by the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_bulk_len: usize,
    pub max_array_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

impl From<&Config> for DecodeLimits {
    fn from(config: &Config) -> Self {
        Self {
            max_bulk_len: config.max_bulk_len,
            max_array_len: config.max_array_len,
        }
    }
}

/// One complete reply, as framed on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `+` line, without sigil and terminator
    Status(Vec<u8>),

    /// `-` line, without sigil and terminator
    Error(Vec<u8>),

    /// `:` line
    Integer(i64),

    /// `$` reply; `None` for `$-1`
    Bulk(Option<Vec<u8>>),

    /// `*` reply; `None` for a negative count
    Array(Option<Vec<Frame>>),
}

impl Frame {
    /// Short name of the frame shape, for logs and error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Status(_) => "status",
            Frame::Error(_) => "error",
            Frame::Integer(_) => "integer",
            Frame::Bulk(Some(_)) => "bulk",
            Frame::Bulk(None) => "null bulk",
            Frame::Array(Some(_)) => "array",
            Frame::Array(None) => "null array",
        }
    }

    /// Error text of an error frame
    pub fn error_text(&self) -> Option<String> {
        match self {
            Frame::Error(msg) => Some(String::from_utf8_lossy(msg).into_owned()),
            _ => None,
        }
    }
}

// =============================================================================
// Stream-based Reply Reading
// =============================================================================

/// Read one line and return it without its CRLF terminator
///
/// Blocks until a `\n` is observed or the stream ends.
pub fn read_line<R: BufRead>(reader: &mut R) -> Result<Vec<u8>> {
    let mut line = Vec::new();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', &mut line)?;

    if read == 0 {
        return Err(KvError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed by remote side",
        )));
    }

    if line.last() != Some(&b'\n') {
        if read >= MAX_LINE_LEN {
            return Err(KvError::Protocol(format!(
                "Reply line exceeds {} bytes",
                MAX_LINE_LEN
            )));
        }
        return Err(KvError::Io(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            "connection closed in the middle of a reply line",
        )));
    }

    if !line.ends_with(CRLF) {
        return Err(KvError::Protocol(
            "Reply line not terminated by CRLF".to_string(),
        ));
    }

    line.truncate(line.len() - CRLF.len());
    Ok(line)
}

/// Read one complete reply frame
pub fn read_frame<R: BufRead>(reader: &mut R, limits: &DecodeLimits) -> Result<Frame> {
    read_frame_at(reader, limits, 0)
}

fn read_frame_at<R: BufRead>(reader: &mut R, limits: &DecodeLimits, depth: usize) -> Result<Frame> {
    let line = read_line(reader)?;
    let (sigil, payload) = match line.split_first() {
        Some((sigil, payload)) => (*sigil, payload),
        None => {
            return Err(KvError::Protocol("Empty reply line".to_string()));
        }
    };

    match sigil {
        b'+' => Ok(Frame::Status(payload.to_vec())),
        b'-' => Ok(Frame::Error(payload.to_vec())),
        b':' => Ok(Frame::Integer(parse_integer(payload))),
        b'$' => read_bulk_body(reader, payload, limits),
        b'*' => read_array_body(reader, payload, limits, depth),
        other => Err(KvError::Protocol(format!(
            "Unknown reply type byte: 0x{:02x}",
            other
        ))),
    }
}

fn read_bulk_body<R: BufRead>(reader: &mut R, header: &[u8], limits: &DecodeLimits) -> Result<Frame> {
    let declared = parse_length(header, "bulk length")?;
    if declared == -1 {
        return Ok(Frame::Bulk(None));
    }
    if declared < -1 {
        return Err(KvError::Protocol(format!(
            "Invalid bulk length: {}",
            declared
        )));
    }

    let len = declared as usize;
    if len > limits.max_bulk_len {
        return Err(KvError::Protocol(format!(
            "Bulk string too large: {} bytes (max {})",
            len, limits.max_bulk_len
        )));
    }

    // Payload plus its trailing CRLF
    let mut payload = vec![0u8; len + CRLF.len()];
    reader.read_exact(&mut payload)?;

    if !payload.ends_with(CRLF) {
        return Err(KvError::Protocol(
            "Bulk string not terminated by CRLF".to_string(),
        ));
    }

    payload.truncate(len);
    Ok(Frame::Bulk(Some(payload)))
}

fn read_array_body<R: BufRead>(
    reader: &mut R,
    header: &[u8],
    limits: &DecodeLimits,
    depth: usize,
) -> Result<Frame> {
    let declared = parse_length(header, "array count")?;
    if declared < 0 {
        return Ok(Frame::Array(None));
    }

    let count = declared as usize;
    if count > limits.max_array_len {
        return Err(KvError::Protocol(format!(
            "Array too large: {} elements (max {})",
            count, limits.max_array_len
        )));
    }
    if depth >= MAX_NESTING_DEPTH {
        return Err(KvError::Protocol(format!(
            "Array nesting deeper than {}",
            MAX_NESTING_DEPTH
        )));
    }

    let mut items = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        items.push(read_frame_at(reader, limits, depth + 1)?);
    }
    Ok(Frame::Array(Some(items)))
}

// =============================================================================
// Numeric Parsing
// =============================================================================

/// Parse a declared bulk length or array count
///
/// Strict: anything but an optionally signed run of decimal digits is a
/// protocol error, since the stream cannot be resynchronized afterwards.
fn parse_length(digits: &[u8], what: &str) -> Result<i64> {
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| {
            KvError::Protocol(format!(
                "Malformed {}: {:?}",
                what,
                String::from_utf8_lossy(digits)
            ))
        })
}

/// Parse an integer reply payload the way C's `atol` does
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit, and input with no digits yields `0`. Values outside `i64`
/// also yield `0`.
pub fn parse_integer(digits: &[u8]) -> i64 {
    let mut rest = digits;
    while let [first, tail @ ..] = rest {
        if first.is_ascii_whitespace() {
            rest = tail;
        } else {
            break;
        }
    }

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i64::from(b - b'0');
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        match next {
            Some(v) => value = v,
            None => return 0,
        }
    }
    value
}
