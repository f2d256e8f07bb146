//! # Wire Protocol
//!
//! Incremental framing and command parsing for the line-oriented protocol.
//!
//! ## Framing
//!
//! The stream carries `;`-delimited records with no length prefix. The
//! literal byte sequence `\r\n\r\n` anywhere in the stream terminates the
//! session. Records seen before the terminator are still delivered, so a
//! client can send `GET MAP;\r\n\r\n` in one chunk and get its map before
//! the closing `Pong`.
//!
//! ## Design
//!
//! - [`MessageScanner`] buffers across reads: a record or the terminator
//!   split over two reads is reassembled, not dropped (the historical
//!   single-read-buffer behavior was a known limitation)
//! - The carried buffer is bounded; a stream with no delimiter in sight
//!   overflows the scanner and costs the client its connection
//! - Bytes after the terminator are discarded; the session is over
//! - [`Command::parse`] is strict about `GET MAP` (exact record match) and
//!   lenient about everything it does not recognize

use std::num::ParseIntError;
use thiserror::Error;

use crate::{MAX_BUFFERED_BYTES, RECORD_DELIMITER, SESSION_TERMINATOR};

/// A malformed record that deserves a log line before being skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// An `ADD` carried a coordinate token that is not a base-10 integer.
    #[error("invalid coordinate {token:?}: {source}")]
    InvalidCoordinate {
        /// The offending token.
        token: String,
        /// The integer parse failure.
        source: ParseIntError,
    },
}

/// A parsed client command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// `ADD <x> <y>`: set a cell alive. Never kills.
    ///
    /// Coordinates are kept signed here; the bounds check against the
    /// actual grid happens at the session layer.
    Add {
        /// Requested x coordinate.
        x: i64,
        /// Requested y coordinate.
        y: i64,
    },
    /// `GET MAP`: request a whole-grid snapshot.
    GetMap,
}

impl Command {
    /// Parses one record into a command.
    ///
    /// Returns `Ok(None)` for records that are not commands: unknown
    /// verbs, bare `ADD` without coordinates, empty records. Those are
    /// ignored without a client-visible error.
    ///
    /// # Errors
    ///
    /// [`CommandError::InvalidCoordinate`] when an `ADD` has coordinate
    /// tokens that do not parse; the caller logs and skips the record.
    pub fn parse(record: &str) -> Result<Option<Self>, CommandError> {
        if record == "GET MAP" {
            return Ok(Some(Self::GetMap));
        }

        let tokens: Vec<&str> = record.split_whitespace().collect();
        if tokens.first() == Some(&"ADD") && tokens.len() >= 3 {
            let x = parse_coordinate(tokens[1])?;
            let y = parse_coordinate(tokens[2])?;
            return Ok(Some(Self::Add { x, y }));
        }

        Ok(None)
    }
}

/// Parses one base-10 coordinate token.
fn parse_coordinate(token: &str) -> Result<i64, CommandError> {
    token
        .parse()
        .map_err(|source| CommandError::InvalidCoordinate {
            token: token.to_string(),
            source,
        })
}

/// The carried buffer outgrew its bound without a delimiter in sight.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("stream exceeded {limit} buffered bytes without a record delimiter")]
pub struct ScanOverflow {
    /// The configured buffer bound.
    pub limit: usize,
}

/// Incremental scanner that reassembles records across reads.
#[derive(Debug)]
pub struct MessageScanner {
    /// Unconsumed bytes carried between reads.
    buf: Vec<u8>,
    /// Set once the session terminator has been seen.
    terminated: bool,
    /// Bound on the carried buffer.
    limit: usize,
}

impl Default for MessageScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageScanner {
    /// Creates an empty scanner with the default buffer bound.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(MAX_BUFFERED_BYTES)
    }

    /// Creates an empty scanner carrying at most `limit` bytes.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            terminated: false,
            limit,
        }
    }

    /// Feeds one read chunk into the scanner.
    ///
    /// After the terminator has been seen, further bytes are discarded.
    ///
    /// # Errors
    ///
    /// [`ScanOverflow`] if the buffered stream exceeds the bound without a
    /// terminator; the caller drops the connection.
    pub fn extend(&mut self, chunk: &[u8]) -> Result<(), ScanOverflow> {
        if self.terminated {
            return Ok(());
        }
        self.buf.extend_from_slice(chunk);
        if let Some(pos) = find(&self.buf, SESSION_TERMINATOR) {
            // Everything past the terminator belongs to no session.
            self.buf.truncate(pos);
            self.terminated = true;
        } else if self.buf.len() > self.limit {
            return Err(ScanOverflow { limit: self.limit });
        }
        Ok(())
    }

    /// Pops the next complete record, if any.
    ///
    /// A record is complete when followed by the `;` delimiter, or - once
    /// the terminator has been seen - when it is the final unterminated
    /// tail of the stream.
    pub fn next_record(&mut self) -> Option<String> {
        if let Some(pos) = self.buf.iter().position(|&b| b == RECORD_DELIMITER) {
            let record = String::from_utf8_lossy(&self.buf[..pos]).into_owned();
            self.buf.drain(..=pos);
            return Some(record);
        }
        if self.terminated && !self.buf.is_empty() {
            let record = String::from_utf8_lossy(&self.buf).into_owned();
            self.buf.clear();
            return Some(record);
        }
        None
    }

    /// Flushes the unterminated tail as a final record.
    ///
    /// Called at end-of-stream: a client that half-closes after
    /// `GET MAP` with no trailing `;` still gets its map, matching the
    /// historical split-on-`;` behavior where the last fragment of a
    /// chunk was processed too.
    pub fn flush_tail(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let record = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Some(record)
    }

    /// Returns true once the session terminator has been seen.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }
}

/// First position of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
