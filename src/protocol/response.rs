//! Response definitions
//!
//! A decoded reply. Each variant owns exactly one payload and the typed
//! accessors refuse to read a payload under the wrong tag.

use std::collections::HashMap;
use std::fmt;

use crate::error::{KvError, Result};

/// Binary-safe key/value mapping produced by hash-shaped replies
pub type ByteMap = HashMap<Vec<u8>, Vec<u8>>;

/// The type name a key holds on the remote side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    String,
    List,
    Set,
    ZSet,
    Hash,
    Stream,
    None,
}

impl KeyType {
    /// Map the literal word sent by the remote side
    pub fn from_name(name: &[u8]) -> Option<Self> {
        match name {
            b"string" => Some(KeyType::String),
            b"list" => Some(KeyType::List),
            b"set" => Some(KeyType::Set),
            b"zset" => Some(KeyType::ZSet),
            b"hash" => Some(KeyType::Hash),
            b"stream" => Some(KeyType::Stream),
            b"none" => Some(KeyType::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::ZSet => "zset",
            KeyType::Hash => "hash",
            KeyType::Stream => "stream",
            KeyType::None => "none",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tag of a [`ResponseValue`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseTag {
    Error,
    Absent,
    Integer,
    Boolean,
    Double,
    BulkString,
    Array,
    Hash,
    Type,
    Queued,
}

impl fmt::Display for ResponseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResponseTag::Error => "error",
            ResponseTag::Absent => "absent",
            ResponseTag::Integer => "integer",
            ResponseTag::Boolean => "boolean",
            ResponseTag::Double => "double",
            ResponseTag::BulkString => "bulk string",
            ResponseTag::Array => "array",
            ResponseTag::Hash => "hash",
            ResponseTag::Type => "type",
            ResponseTag::Queued => "queued",
        };
        f.write_str(name)
    }
}

/// A decoded reply
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    /// Error reply (`Some(message)`) or a reply of the wrong shape (`None`)
    Error(Option<String>),

    /// The remote side reported "no value" (null bulk string)
    Absent,

    Integer(i64),

    Boolean(bool),

    Double(f64),

    BulkString(Vec<u8>),

    /// Ordered bulk strings
    Array(Vec<Vec<u8>>),

    Hash(ByteMap),

    /// Type name of a key
    Type(KeyType),

    /// Placeholder returned while a command waits in a batch
    Queued,
}

impl ResponseValue {
    /// An `Error` with no message
    pub fn mismatch() -> Self {
        ResponseValue::Error(None)
    }

    /// The tag of this value
    pub fn tag(&self) -> ResponseTag {
        match self {
            ResponseValue::Error(_) => ResponseTag::Error,
            ResponseValue::Absent => ResponseTag::Absent,
            ResponseValue::Integer(_) => ResponseTag::Integer,
            ResponseValue::Boolean(_) => ResponseTag::Boolean,
            ResponseValue::Double(_) => ResponseTag::Double,
            ResponseValue::BulkString(_) => ResponseTag::BulkString,
            ResponseValue::Array(_) => ResponseTag::Array,
            ResponseValue::Hash(_) => ResponseTag::Hash,
            ResponseValue::Type(_) => ResponseTag::Type,
            ResponseValue::Queued => ResponseTag::Queued,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ResponseValue::Error(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ResponseValue::Absent)
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, ResponseValue::Queued)
    }

    /// Message carried by an error reply, if any
    pub fn error_message(&self) -> Option<&str> {
        match self {
            ResponseValue::Error(msg) => msg.as_deref(),
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Typed accessors
    // -------------------------------------------------------------------------

    pub fn as_integer(&self) -> Result<i64> {
        match self {
            ResponseValue::Integer(v) => Ok(*v),
            other => Err(other.mismatch_with(ResponseTag::Integer)),
        }
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            ResponseValue::Boolean(v) => Ok(*v),
            other => Err(other.mismatch_with(ResponseTag::Boolean)),
        }
    }

    pub fn as_double(&self) -> Result<f64> {
        match self {
            ResponseValue::Double(v) => Ok(*v),
            other => Err(other.mismatch_with(ResponseTag::Double)),
        }
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            ResponseValue::BulkString(v) => Ok(v),
            other => Err(other.mismatch_with(ResponseTag::BulkString)),
        }
    }

    /// Bulk string payload as UTF-8 text, replacing invalid sequences
    pub fn as_text(&self) -> Result<String> {
        self.as_bytes()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn as_array(&self) -> Result<&[Vec<u8>]> {
        match self {
            ResponseValue::Array(v) => Ok(v),
            other => Err(other.mismatch_with(ResponseTag::Array)),
        }
    }

    pub fn as_hash(&self) -> Result<&ByteMap> {
        match self {
            ResponseValue::Hash(v) => Ok(v),
            other => Err(other.mismatch_with(ResponseTag::Hash)),
        }
    }

    pub fn as_key_type(&self) -> Result<KeyType> {
        match self {
            ResponseValue::Type(v) => Ok(*v),
            other => Err(other.mismatch_with(ResponseTag::Type)),
        }
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            ResponseValue::BulkString(v) => Ok(v),
            other => Err(other.mismatch_with(ResponseTag::BulkString)),
        }
    }

    pub fn into_array(self) -> Result<Vec<Vec<u8>>> {
        match self {
            ResponseValue::Array(v) => Ok(v),
            other => Err(other.mismatch_with(ResponseTag::Array)),
        }
    }

    pub fn into_hash(self) -> Result<ByteMap> {
        match self {
            ResponseValue::Hash(v) => Ok(v),
            other => Err(other.mismatch_with(ResponseTag::Hash)),
        }
    }

    /// Number of elements for `Array` and `Hash` values
    pub fn element_count(&self) -> Result<usize> {
        match self {
            ResponseValue::Array(v) => Ok(v.len()),
            ResponseValue::Hash(v) => Ok(v.len()),
            other => Err(other.mismatch_with(ResponseTag::Array)),
        }
    }

    fn mismatch_with(&self, expected: ResponseTag) -> KvError {
        KvError::TypeMismatch {
            expected,
            found: self.tag(),
        }
    }
}

impl fmt::Display for ResponseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseValue::Error(Some(msg)) => write!(f, "(error) {}", msg),
            ResponseValue::Error(None) => f.write_str("(error)"),
            ResponseValue::Absent => f.write_str("(nil)"),
            ResponseValue::Integer(v) => write!(f, "(integer) {}", v),
            ResponseValue::Boolean(v) => write!(f, "(boolean) {}", v),
            ResponseValue::Double(v) => write!(f, "(double) {}", v),
            ResponseValue::BulkString(v) => {
                write!(f, "\"{}\"", String::from_utf8_lossy(v).escape_debug())
            }
            ResponseValue::Array(items) => {
                if items.is_empty() {
                    return f.write_str("(empty array)");
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{}) \"{}\"",
                        i + 1,
                        String::from_utf8_lossy(item).escape_debug()
                    )?;
                }
                Ok(())
            }
            ResponseValue::Hash(map) => {
                if map.is_empty() {
                    return f.write_str("(empty hash)");
                }
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort();
                for (i, (k, v)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{} => \"{}\"",
                        String::from_utf8_lossy(k),
                        String::from_utf8_lossy(v).escape_debug()
                    )?;
                }
                Ok(())
            }
            ResponseValue::Type(t) => write!(f, "{}", t),
            ResponseValue::Queued => f.write_str("QUEUED"),
        }
    }
}
