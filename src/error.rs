//! Error types for kvlink
//!
//! Provides a unified error type for all client operations.
//!
//! Only failures that the caller cannot recover from on a per-reply basis
//! are surfaced here. A reply of the wrong shape is not an error at this
//! level: decode routines turn it into [`ResponseValue::Error`].
//!
//! [`ResponseValue::Error`]: crate::protocol::ResponseValue::Error

use thiserror::Error;

use crate::protocol::ResponseTag;
use crate::session::SessionMode;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for kvlink operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection is broken by an earlier fatal error")]
    ConnectionBroken,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Cannot enter {requested} mode while {active} mode is active")]
    ModeConflict {
        active: SessionMode,
        requested: SessionMode,
    },

    // -------------------------------------------------------------------------
    // Value Errors
    // -------------------------------------------------------------------------
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ResponseTag,
        found: ResponseTag,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KvError {
    /// Whether this error leaves the byte stream unusable.
    ///
    /// A fatal error means the reply in flight was not fully consumed (or
    /// could not be sent), so nothing else may be sent on the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            KvError::Io(_) | KvError::Protocol(_) | KvError::ConnectionBroken
        )
    }
}
