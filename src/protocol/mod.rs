//! Protocol Module
//!
//! Defines the line-oriented, length-prefixed wire protocol.
//!
//! ## Request Format
//! ```text
//! ┌─────────────┬───────────────────────────────────────────────┐
//! │ *<n>\r\n    │ n × ( $<len>\r\n <len bytes> \r\n )           │
//! └─────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! The first element is the keyword, the rest are arguments. Every element
//! is length-prefixed, so NUL, CR and LF travel unchanged.
//!
//! ## Reply Types
//! - `+` status line
//! - `-` error line
//! - `:` integer
//! - `$` bulk string (`$-1` = absent)
//! - `*` array (negative count = empty)
//!
//! ## Layers
//! - [`codec`]: command encoding and primitive [`Frame`] reading
//! - [`decoder`]: per-command [`Decoder`] turning a frame into a [`ResponseValue`]

mod command;
mod response;
mod sort;
pub mod codec;
pub mod decoder;

pub use command::Command;
pub use response::{ByteMap, KeyType, ResponseTag, ResponseValue};
pub use sort::{SortOrder, SortParams};
pub use codec::{
    encode_command, encode_command_into, write_command,
    read_line, read_frame, parse_integer,
    DecodeLimits, Frame,
};
pub use decoder::{parse_info, Decoder, QUEUED_ACK};
