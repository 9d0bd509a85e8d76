//! Network Module
//!
//! Byte-stream transport to the remote side.
//!
//! ## Architecture
//! - One connection per client, no pooling
//! - Blocking reads and writes on the calling thread
//! - Any stream implementing `Read + Write` can stand in for TCP

mod connection;

pub use connection::Connection;
