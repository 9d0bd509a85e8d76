//! Reply decoding routines
//!
//! The shape of a reply is not self-describing for the caller: it depends on
//! which command was sent. Each command is therefore paired with a
//! [`Decoder`] when it is built, and that decoder travels with it through
//! the session (immediately, or queued inside a transaction or pipeline).
//!
//! A decoder never fails on a reply of the wrong shape. It yields
//! [`ResponseValue::Error`] instead, and because the frame was already read
//! in full the stream stays in sync.

use std::io::BufRead;

use crate::error::Result;
use super::codec::{read_frame, DecodeLimits, Frame};
use super::{ByteMap, KeyType, ResponseValue};

/// Acknowledgement sent for every command queued inside a transaction
pub const QUEUED_ACK: &[u8] = b"QUEUED";

/// How to turn one reply frame into a [`ResponseValue`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoder {
    /// `+...` → `Boolean(true)`
    Status,

    /// `+...` → `BulkString` holding the line
    SingleLine,

    /// `+QUEUED` → `Queued`
    Queued,

    /// `:n` → `Integer(n)`
    Integer,

    /// `:0` / `:1` → `Boolean`; any other integer is an error
    IntegerAsBool,

    /// `$...` → `BulkString`, `$-1` → `Absent`
    Bulk,

    /// Bulk string holding a decimal number → `Double`
    Double,

    /// Array of bulk strings → `Array`
    MultiBulk,

    /// Array of alternating keys and values → `Hash`
    KeyValueList,

    /// Array answering a multi-get for `keys`, position by position
    MultiGet { keys: Vec<Vec<u8>> },

    /// Bulk string of `key:value` lines → `Hash`
    Info,

    /// `+<type name>` → `Type`
    TypeName,
}

impl Decoder {
    /// Read one reply from the stream and decode it
    ///
    /// `Err` only for failures that break the stream; shape mismatches are
    /// returned as `Ok(ResponseValue::Error(..))`.
    pub fn read<R: BufRead>(&self, reader: &mut R, limits: &DecodeLimits) -> Result<ResponseValue> {
        let frame = read_frame(reader, limits)?;
        Ok(self.decode(frame))
    }

    /// Decode an already framed reply
    pub fn decode(&self, frame: Frame) -> ResponseValue {
        if let Some(message) = frame.error_text() {
            return ResponseValue::Error(Some(message));
        }
        // A null bulk means "no value" whatever shape was expected
        if frame == Frame::Bulk(None) {
            return ResponseValue::Absent;
        }

        match self {
            Decoder::Status => match frame {
                Frame::Status(_) => ResponseValue::Boolean(true),
                _ => ResponseValue::mismatch(),
            },
            Decoder::SingleLine => match frame {
                Frame::Status(line) => ResponseValue::BulkString(line),
                _ => ResponseValue::mismatch(),
            },
            Decoder::Queued => match frame {
                Frame::Status(line) if line == QUEUED_ACK => ResponseValue::Queued,
                _ => ResponseValue::mismatch(),
            },
            Decoder::Integer => match frame {
                Frame::Integer(n) => ResponseValue::Integer(n),
                _ => ResponseValue::mismatch(),
            },
            Decoder::IntegerAsBool => match frame {
                Frame::Integer(0) => ResponseValue::Boolean(false),
                Frame::Integer(1) => ResponseValue::Boolean(true),
                _ => ResponseValue::mismatch(),
            },
            Decoder::Bulk => decode_bulk(frame),
            Decoder::Double => decode_double(frame),
            Decoder::MultiBulk => decode_multi_bulk(frame),
            Decoder::KeyValueList => decode_key_value_list(frame),
            Decoder::MultiGet { keys } => decode_multi_get(keys, frame),
            Decoder::Info => decode_info(frame),
            Decoder::TypeName => match frame {
                Frame::Status(word) => KeyType::from_name(&word)
                    .map(ResponseValue::Type)
                    .unwrap_or_else(ResponseValue::mismatch),
                _ => ResponseValue::mismatch(),
            },
        }
    }
}

fn decode_bulk(frame: Frame) -> ResponseValue {
    match frame {
        Frame::Bulk(Some(payload)) => ResponseValue::BulkString(payload),
        Frame::Bulk(None) => ResponseValue::Absent,
        _ => ResponseValue::mismatch(),
    }
}

fn decode_double(frame: Frame) -> ResponseValue {
    match decode_bulk(frame) {
        ResponseValue::BulkString(text) => std::str::from_utf8(&text)
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .map(ResponseValue::Double)
            .unwrap_or_else(ResponseValue::mismatch),
        other => other,
    }
}

fn decode_multi_bulk(frame: Frame) -> ResponseValue {
    let items = match frame {
        Frame::Array(Some(items)) => items,
        Frame::Array(None) => return ResponseValue::Array(Vec::new()),
        _ => return ResponseValue::mismatch(),
    };

    let mut elements = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Frame::Bulk(Some(payload)) => elements.push(payload),
            // One bad element spoils the whole reply
            _ => return ResponseValue::mismatch(),
        }
    }
    ResponseValue::Array(elements)
}

fn decode_key_value_list(frame: Frame) -> ResponseValue {
    let elements = match decode_multi_bulk(frame) {
        ResponseValue::Array(elements) => elements,
        other => return other,
    };
    if elements.len() % 2 != 0 {
        return ResponseValue::mismatch();
    }

    let mut map = ByteMap::with_capacity(elements.len() / 2);
    let mut iter = elements.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        map.insert(key, value);
    }
    ResponseValue::Hash(map)
}

fn decode_multi_get(keys: &[Vec<u8>], frame: Frame) -> ResponseValue {
    let items = match frame {
        Frame::Array(Some(items)) if !keys.is_empty() && items.len() == keys.len() => items,
        _ => return ResponseValue::mismatch(),
    };

    let mut map = ByteMap::with_capacity(keys.len());
    for (key, item) in keys.iter().zip(items) {
        match item {
            Frame::Bulk(Some(value)) => {
                map.insert(key.clone(), value);
            }
            Frame::Bulk(None) => {}
            _ => return ResponseValue::mismatch(),
        }
    }
    ResponseValue::Hash(map)
}

fn decode_info(frame: Frame) -> ResponseValue {
    match frame {
        Frame::Bulk(Some(text)) => ResponseValue::Hash(parse_info(&text)),
        _ => ResponseValue::mismatch(),
    }
}

/// Split an info blob into `key:value` pairs
///
/// Lines without a colon (section headers, blank lines) are skipped. When a
/// key repeats, the first value wins.
pub fn parse_info(text: &[u8]) -> ByteMap {
    let mut map = ByteMap::new();
    for line in text.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if let Some(colon) = line.iter().position(|&b| b == b':') {
            map.entry(line[..colon].to_vec())
                .or_insert_with(|| line[colon + 1..].to_vec());
        }
    }
    map
}
