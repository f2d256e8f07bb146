//! # Lifeboard Server
//!
//! A Game of Life board advanced on a fixed tick and served concurrently
//! over a line-oriented TCP protocol.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LIFEBOARD SERVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────┐    │
//! │  │ Listener     │   │ Sessions     │   │ Tick Source  │    │
//! │  │ (accept loop)│──▶│ (1 thread /  │   │ (1000ms)     │    │
//! │  └──────────────┘   │  connection) │   └──────┬───────┘    │
//! │                     └──────┬───────┘          │            │
//! │                            │ commands         │ ticks      │
//! │                            ▼                  ▼            │
//! │                  ┌─────────────────────────────────┐       │
//! │                  │ Board Actor (sole grid owner)   │       │
//! │                  │ - step() on tick                │       │
//! │                  │ - SetAlive / Snapshot / Replace │       │
//! │                  └─────────────────────────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Consistency Guarantees
//!
//! The grid has exactly one owner: the board actor thread. Ticks and client
//! commands are serialized through one `select!` loop, so:
//!
//! - `GET MAP` always returns a fully consistent generation, never a grid
//!   torn mid-tick
//! - `ADD` lands atomically, either wholly before or wholly after any
//!   in-flight tick
//! - Steps can never overlap each other
//!
//! ## Protocol
//!
//! Text over TCP, default port 3333. Records are separated by `;` with no
//! length prefix; the literal byte sequence `\r\n\r\n` anywhere in the
//! stream ends the session, after which the server sends `Pong` and closes.
//!
//! - `ADD <x> <y>` - set a cell alive (out of bounds: silently ignored)
//! - `GET MAP` - JSON snapshot of the whole grid, followed by `;`

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod codec;
pub mod config;
pub mod listener;
pub mod protocol;
pub mod session;
pub mod state;
pub mod tick;

pub use codec::CodecError;
pub use config::{ConfigError, ServerConfig};
pub use listener::{Server, ServerError};
pub use protocol::{Command, CommandError, MessageScanner, ScanOverflow};
pub use session::Session;
pub use state::{BoardGone, BoardHandle, GenerationHook};
pub use tick::TickSource;

/// Default TCP port the listener binds.
pub const DEFAULT_PORT: u16 = 3333;

/// Default grid width.
pub const DEFAULT_SIZE_X: usize = 20;

/// Default grid height.
pub const DEFAULT_SIZE_Y: usize = 20;

/// Default tick interval in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 1000;

/// Per-connection read buffer size (48 KiB).
///
/// A whole `GET MAP` response or batched `ADD` set must fit one
/// read/write cycle; larger payloads are a known limitation.
pub const READ_BUFFER_SIZE: usize = 48 * 1024;

/// Maximum bytes the scanner carries between reads (4x the read buffer).
///
/// A client streaming bytes with no delimiter and no terminator hits this
/// bound and loses its connection; per-connection memory stays capped the
/// way the fixed read buffer always capped it.
pub const MAX_BUFFERED_BYTES: usize = 4 * READ_BUFFER_SIZE;

/// Record delimiter within the byte stream.
pub const RECORD_DELIMITER: u8 = b';';

/// Session terminator: this sequence anywhere in the stream ends the
/// session.
pub const SESSION_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Acknowledgement written to the client when a session ends cleanly.
pub const ACK_MESSAGE: &str = "Pong";
