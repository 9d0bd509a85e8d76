//! Connection Handler
//!
//! Owns the byte stream to the remote side.

use std::io::{BufReader, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::protocol::{encode_command, read_frame, Command, DecodeLimits, Decoder, Frame, ResponseValue};

/// Read buffer size for the stream
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// A single connection to the remote side
///
/// Replies are read through a buffered reader; writes go straight to the
/// underlying stream and are flushed immediately. Once a fatal error occurs
/// the connection refuses all further I/O, since the position of the next
/// reply in the stream is unknown.
pub struct Connection<S: Read + Write> {
    /// Stream, buffered for reads only
    stream: BufReader<S>,

    /// Limits on lengths declared by the remote side
    limits: DecodeLimits,

    /// Peer address for logging
    peer_addr: String,

    /// Set after the first fatal error
    broken: bool,
}

impl Connection<TcpStream> {
    /// Connect over TCP using the endpoint and socket options in `config`
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;

        let addr = config.addr();
        let candidates = addr
            .to_socket_addrs()
            .map_err(|e| KvError::Connection(format!("cannot resolve {}: {}", addr, e)))?;

        let mut last_error = None;
        for candidate in candidates {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&candidate, timeout),
                None => TcpStream::connect(candidate),
            };
            match attempt {
                Ok(stream) => return Self::from_tcp(stream, config),
                Err(e) => {
                    tracing::debug!("Connect to {} failed: {}", candidate, e);
                    last_error = Some(e);
                }
            }
        }

        Err(KvError::Connection(match last_error {
            Some(e) => format!("cannot connect to {}: {}", addr, e),
            None => format!("no address found for {}", addr),
        }))
    }

    /// Wrap an already connected TCP stream, applying socket options
    pub fn from_tcp(stream: TcpStream, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(config.nodelay)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        let mut connection = Self::new(stream, DecodeLimits::from(config));
        connection.peer_addr = peer_addr;

        tracing::debug!("Connection established to {}", connection.peer_addr);
        Ok(connection)
    }

    /// Configure socket timeouts (0 = no timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let stream = self.stream.get_ref();
        stream.set_read_timeout((read_ms > 0).then(|| Duration::from_millis(read_ms)))?;
        stream.set_write_timeout((write_ms > 0).then(|| Duration::from_millis(write_ms)))?;
        Ok(())
    }
}

impl<S: Read + Write> Connection<S> {
    /// Wrap any byte stream
    pub fn new(stream: S, limits: DecodeLimits) -> Self {
        Self {
            stream: BufReader::with_capacity(READ_BUFFER_SIZE, stream),
            limits,
            peer_addr: "stream".to_string(),
            broken: false,
        }
    }

    /// Encode and send one command
    pub fn send(&mut self, command: &Command) -> Result<()> {
        tracing::trace!("Sending to {}: {:?}", self.peer_addr, command);
        self.write_all(&encode_command(command))
    }

    /// Send raw, already encoded bytes in a single write
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_usable()?;
        let stream = self.stream.get_mut();
        let result = stream
            .write_all(bytes)
            .and_then(|_| stream.flush())
            .map_err(KvError::from);
        self.track(result)
    }

    /// Read one complete reply frame
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.ensure_usable()?;
        let result = read_frame(&mut self.stream, &self.limits);
        self.track(result)
    }

    /// Read one reply and decode it with `decoder`
    pub fn read_reply(&mut self, decoder: &Decoder) -> Result<ResponseValue> {
        let frame = self.read_frame()?;
        let value = decoder.decode(frame);
        tracing::trace!("Decoded {:?} reply from {}: {:?}", decoder, self.peer_addr, value);
        Ok(value)
    }

    /// Whether an earlier fatal error made the stream unusable
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    pub fn limits(&self) -> &DecodeLimits {
        &self.limits
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &S {
        self.stream.get_ref()
    }

    /// Give back the underlying stream; buffered unread bytes are lost
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    fn ensure_usable(&self) -> Result<()> {
        if self.broken {
            return Err(KvError::ConnectionBroken);
        }
        Ok(())
    }

    fn track<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_fatal() && !self.broken {
                tracing::warn!("Connection to {} is no longer usable: {}", self.peer_addr, e);
                self.broken = true;
            }
        }
        result
    }
}
