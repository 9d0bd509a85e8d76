//! # kvlink
//!
//! A synchronous client for line-oriented key-value stores with:
//! - Binary-safe, length-prefixed command encoding
//! - Typed reply decoding with loud failure on tag mismatch
//! - Transactions (MULTI/EXEC) and client-side pipelining
//! - A single blocking connection, no pooling or reconnection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Client                                │
//! │          (one method per command: Command + Decoder)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ submit(command, decoder)
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Session                                │
//! │        (Normal / Transaction / Pipeline, FIFO decoders)      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │          │   Decoder   │
//!   │ (Command →  │          │ (Frame →    │
//!   │   bytes)    │          │  Response)  │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌───────────────────────────────┴─────┐
//!   │            Connection               │
//!   │      (Read + Write byte stream)     │
//!   └─────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kvlink::Client;
//!
//! let mut client = Client::open("127.0.0.1", 6379)?;
//! client.set("greeting", b"hello\0world")?;
//! let value = client.get("greeting")?;
//! assert_eq!(value.as_bytes()?, b"hello\0world");
//!
//! client.pipeline()?;
//! client.incr("counter")?;
//! client.get("greeting")?;
//! let replies = client.exec()?;
//! assert_eq!(replies.len(), 2);
//! # Ok::<(), kvlink::KvError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod session;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use client::{Aggregate, Client};
pub use protocol::{Command, Decoder, KeyType, ResponseTag, ResponseValue, SortOrder, SortParams};
pub use session::{Session, SessionMode};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvlink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
