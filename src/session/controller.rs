//! Session mode controller
//!
//! Decides, per submitted command, whether it runs now or waits for exec,
//! and pairs every reply with the decoder chosen when the command was built.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::net::TcpStream;

use bytes::BytesMut;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::network::Connection;
use crate::protocol::{encode_command_into, Command, Decoder, Frame, ResponseValue};
use super::SessionMode;

/// A connection plus the batching state layered on top of it
///
/// ## Round trips per mode
///
/// - **Normal**: one write and one reply per command.
/// - **Transaction**: one write and one `+QUEUED` acknowledgement per
///   command, then one write (`EXEC`) and one array reply on exec.
/// - **Pipeline**: no I/O per command; on exec a single write carrying every
///   buffered command, then one reply per command.
///
/// Replies are matched to decoders strictly in submission order.
pub struct Session<S: Read + Write> {
    connection: Connection<S>,

    mode: SessionMode,

    /// Decoders for replies still to be read, oldest first
    pending: VecDeque<Decoder>,

    /// Encoded commands waiting for a pipeline flush
    outgoing: BytesMut,
}

impl Session<TcpStream> {
    /// Connect over TCP
    pub fn connect(config: &Config) -> Result<Self> {
        Ok(Self::new(Connection::connect(config)?))
    }
}

impl<S: Read + Write> Session<S> {
    pub fn new(connection: Connection<S>) -> Self {
        Self {
            connection,
            mode: SessionMode::Normal,
            pending: VecDeque::new(),
            outgoing: BytesMut::new(),
        }
    }

    // =========================================================================
    // Mode transitions
    // =========================================================================

    /// Enter transaction mode (sends `MULTI`)
    ///
    /// Rejected without any I/O while another batch is open.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.ensure_normal(SessionMode::Transaction)?;

        self.connection.send(&Command::new("MULTI"))?;
        match self.connection.read_reply(&Decoder::Status)? {
            ResponseValue::Boolean(true) => {
                self.mode = SessionMode::Transaction;
                tracing::debug!("Entered transaction mode");
                Ok(())
            }
            other => Err(KvError::UnexpectedReply(format!(
                "MULTI answered with {}",
                other
            ))),
        }
    }

    /// Enter pipeline mode (no I/O)
    pub fn begin_pipeline(&mut self) -> Result<()> {
        self.ensure_normal(SessionMode::Pipeline)?;
        self.mode = SessionMode::Pipeline;
        tracing::debug!("Entered pipeline mode");
        Ok(())
    }

    /// Submit one command with the decoder for its reply
    ///
    /// Returns the decoded reply in normal mode and a `Queued` placeholder
    /// in the batching modes.
    pub fn submit(&mut self, command: Command, decoder: Decoder) -> Result<ResponseValue> {
        match self.mode {
            SessionMode::Normal => {
                self.connection.send(&command)?;
                self.connection.read_reply(&decoder)
            }
            SessionMode::Pipeline => {
                if self.connection.is_broken() {
                    return Err(KvError::ConnectionBroken);
                }
                tracing::trace!("Buffering {:?} for pipeline", command);
                encode_command_into(&command, &mut self.outgoing);
                self.pending.push_back(decoder);
                Ok(ResponseValue::Queued)
            }
            SessionMode::Transaction => {
                self.connection.send(&command)?;
                self.pending.push_back(decoder);

                match self.connection.read_reply(&Decoder::Queued)? {
                    ResponseValue::Queued => Ok(ResponseValue::Queued),
                    rejected @ ResponseValue::Error(Some(_)) => {
                        // Not queued remotely, so no reply will come for it
                        self.pending.pop_back();
                        tracing::warn!("Command {:?} was not queued: {}", command, rejected);
                        Ok(rejected)
                    }
                    other => {
                        self.pending.pop_back();
                        Err(KvError::UnexpectedReply(format!(
                            "expected +QUEUED acknowledgement, got {}",
                            other
                        )))
                    }
                }
            }
        }
    }

    /// Run the open batch and return one result per submitted command
    ///
    /// State is back to normal when this returns, whatever the outcome.
    /// In normal mode there is nothing to run and the result is empty.
    pub fn exec(&mut self) -> Result<Vec<ResponseValue>> {
        let mode = self.mode;
        let (decoders, outgoing) = self.reset();

        match mode {
            SessionMode::Normal => Ok(Vec::new()),
            SessionMode::Pipeline => self.exec_pipeline(decoders, outgoing),
            SessionMode::Transaction => self.exec_transaction(decoders),
        }
    }

    /// Drop the open batch
    ///
    /// In transaction mode the remote queue is dropped too (`DISCARD`).
    /// Local state is cleared before any I/O.
    pub fn discard(&mut self) -> Result<()> {
        let mode = self.mode;
        let (decoders, _) = self.reset();
        tracing::debug!("Discarding {} batch of {} commands", mode, decoders.len());

        if mode != SessionMode::Transaction {
            return Ok(());
        }

        self.connection.send(&Command::new("DISCARD"))?;
        match self.connection.read_reply(&Decoder::Status)? {
            ResponseValue::Boolean(true) => Ok(()),
            other => Err(KvError::UnexpectedReply(format!(
                "DISCARD answered with {}",
                other
            ))),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Number of commands waiting for exec
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_broken(&self) -> bool {
        self.connection.is_broken()
    }

    pub fn connection(&self) -> &Connection<S> {
        &self.connection
    }

    pub fn into_connection(self) -> Connection<S> {
        self.connection
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_normal(&self, requested: SessionMode) -> Result<()> {
        if self.mode != SessionMode::Normal {
            return Err(KvError::ModeConflict {
                active: self.mode,
                requested,
            });
        }
        Ok(())
    }

    /// Back to normal mode, handing out whatever was queued
    fn reset(&mut self) -> (VecDeque<Decoder>, BytesMut) {
        self.mode = SessionMode::Normal;
        (std::mem::take(&mut self.pending), self.outgoing.split())
    }

    fn exec_pipeline(&mut self, decoders: VecDeque<Decoder>, outgoing: BytesMut) -> Result<Vec<ResponseValue>> {
        tracing::debug!(
            "Flushing pipeline: {} commands, {} bytes",
            decoders.len(),
            outgoing.len()
        );

        if !outgoing.is_empty() {
            self.connection.write_all(&outgoing)?;
        }

        decoders
            .iter()
            .map(|decoder| self.connection.read_reply(decoder))
            .collect()
    }

    fn exec_transaction(&mut self, decoders: VecDeque<Decoder>) -> Result<Vec<ResponseValue>> {
        tracing::debug!("Committing transaction of {} commands", decoders.len());

        self.connection.send(&Command::new("EXEC"))?;
        match self.connection.read_frame()? {
            Frame::Array(Some(replies)) if replies.len() == decoders.len() => Ok(decoders
                .iter()
                .zip(replies)
                .map(|(decoder, frame)| decoder.decode(frame))
                .collect()),
            Frame::Array(Some(replies)) => Err(KvError::UnexpectedReply(format!(
                "EXEC returned {} replies for {} queued commands",
                replies.len(),
                decoders.len()
            ))),
            Frame::Array(None) => Err(KvError::TransactionAborted(
                "EXEC returned a null reply".to_string(),
            )),
            Frame::Error(message) => Err(KvError::TransactionAborted(
                String::from_utf8_lossy(&message).into_owned(),
            )),
            other => Err(KvError::UnexpectedReply(format!(
                "EXEC answered with a {} reply",
                other.kind()
            ))),
        }
    }
}
