//! # Connection Session
//!
//! One protocol handler per accepted connection.
//!
//! ## Lifecycle
//!
//! ```text
//! read chunk ──▶ scanner ──▶ records ──▶ dispatch
//!    │                                     ├─ ADD    -> bounds check -> board
//!    │                                     └─ GET MAP-> snapshot -> JSON + ';'
//!    ├─ end of stream ─────▶ flush tail record, "Pong", flush, close
//!    ├─ terminator seen ───▶ "Pong", flush, close
//!    ├─ scanner overflow ──▶ log, close without "Pong"
//!    └─ read error ────────▶ log, close without "Pong"
//! ```
//!
//! No failure is ever surfaced to the client as protocol data: a bad or
//! out-of-bounds request simply has no effect.

use std::io::{self, Read, Write};

use crate::codec;
use crate::protocol::{Command, MessageScanner};
use crate::state::BoardHandle;
use crate::{ACK_MESSAGE, READ_BUFFER_SIZE, RECORD_DELIMITER};

/// A single client session over any byte stream.
///
/// Generic over the stream so tests can drive it with in-memory pipes;
/// production hands it a `TcpStream`.
pub struct Session {
    /// Handle to the board actor.
    board: BoardHandle,
    /// Peer label for log lines.
    peer: String,
}

impl Session {
    /// Creates a session bound to the board.
    #[must_use]
    pub fn new(board: BoardHandle, peer: String) -> Self {
        Self { board, peer }
    }

    /// Runs the session until the peer disconnects, sends the terminator,
    /// or an I/O error occurs.
    ///
    /// # Errors
    ///
    /// Any I/O error other than a clean end-of-stream; in that case the
    /// closing `Pong` is not sent.
    pub fn run<S: Read + Write>(&self, stream: &mut S) -> io::Result<()> {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];
        let mut scanner = MessageScanner::new();

        loop {
            let n = stream.read(&mut buf)?;
            if n == 0 {
                // Clean end-of-stream: the unterminated tail is still a
                // record, exactly as it is on the terminator path.
                if let Some(record) = scanner.flush_tail() {
                    self.dispatch(&record, stream)?;
                }
                break;
            }
            scanner
                .extend(&buf[..n])
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            while let Some(record) = scanner.next_record() {
                self.dispatch(&record, stream)?;
            }
            if scanner.is_terminated() {
                break;
            }
        }

        stream.write_all(ACK_MESSAGE.as_bytes())?;
        stream.flush()?;
        tracing::info!("session {} closed, sent {ACK_MESSAGE}", self.peer);
        Ok(())
    }

    /// Handles one record. Write failures bubble up as session-fatal;
    /// everything else is recovered locally.
    fn dispatch<W: Write>(&self, record: &str, out: &mut W) -> io::Result<()> {
        match Command::parse(record) {
            Ok(Some(Command::Add { x, y })) => self.apply_add(x, y),
            Ok(Some(Command::GetMap)) => self.send_map(out)?,
            Ok(None) => {}
            Err(err) => {
                // Local recovery: skip this record, keep the connection.
                tracing::warn!("session {}: skipping record {record:?}: {err}", self.peer);
            }
        }
        Ok(())
    }

    /// The `ADD` path: bounds-check against the grid, then write through
    /// the board handle. Out of bounds is silently ignored.
    fn apply_add(&self, x: i64, y: i64) {
        let (size_x, size_y) = self.board.dimensions();
        let in_bounds = (0..size_x as i64).contains(&x) && (0..size_y as i64).contains(&y);
        if !in_bounds {
            tracing::debug!("session {}: ADD {x} {y} out of bounds, ignored", self.peer);
            return;
        }
        if self.board.set_alive(x as usize, y as usize).is_err() {
            tracing::warn!("session {}: board gone, dropping ADD {x} {y}", self.peer);
            return;
        }
        tracing::debug!("session {}: ADD {x} {y}", self.peer);
    }

    /// The `GET MAP` path: consistent snapshot, JSON payload, trailing
    /// `;`, flush.
    fn send_map<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let grid = self
            .board
            .snapshot()
            .map_err(|err| io::Error::new(io::ErrorKind::NotConnected, err))?;
        let payload = codec::encode(&grid).map_err(io::Error::other)?;
        out.write_all(payload.as_bytes())?;
        out.write_all(&[RECORD_DELIMITER])?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tick::TickSource;
    use lifeboard_core::Grid;

    /// In-memory stream: reads from a scripted input, records writes.
    struct Pipe {
        input: io::Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl Pipe {
        fn new(input: &[u8]) -> Self {
            Self {
                input: io::Cursor::new(input.to_vec()),
                output: Vec::new(),
            }
        }
    }

    impl Read for Pipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.input.read(buf)
        }
    }

    impl Write for Pipe {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn paused_board() -> BoardHandle {
        BoardHandle::spawn(Grid::new(20, 20), TickSource::paused(), None)
    }

    #[test]
    fn test_add_then_get_map() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"ADD 2 2;GET MAP;\r\n\r\n");

        session.run(&mut pipe).unwrap();

        let output = String::from_utf8(pipe.output).unwrap();
        assert!(output.ends_with(ACK_MESSAGE));
        let payload = output
            .strip_suffix(ACK_MESSAGE)
            .unwrap()
            .strip_suffix(';')
            .unwrap();
        let grid = codec::decode(payload).unwrap();
        assert!(grid.get(2, 2).unwrap().alive);
        assert_eq!(grid.live_count(), 1);
        board.shutdown();
    }

    #[test]
    fn test_map_is_delivered_before_pong() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"GET MAP;\r\n\r\n");

        session.run(&mut pipe).unwrap();

        let output = String::from_utf8(pipe.output).unwrap();
        let pong_at = output.rfind(ACK_MESSAGE).unwrap();
        let delim_at = output.find(';').unwrap();
        assert!(delim_at < pong_at);
        assert!(codec::decode(&output[..delim_at]).is_ok());
        board.shutdown();
    }

    #[test]
    fn test_trailing_record_at_eof_is_processed() {
        // Half-close after "GET MAP" with no ';': the map still arrives
        // before the Pong.
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"GET MAP");

        session.run(&mut pipe).unwrap();

        let output = String::from_utf8(pipe.output).unwrap();
        let payload = output
            .strip_suffix(ACK_MESSAGE)
            .unwrap()
            .strip_suffix(';')
            .unwrap();
        assert_eq!(codec::decode(payload).unwrap().live_count(), 0);
        board.shutdown();
    }

    #[test]
    fn test_oversized_stream_is_dropped_without_pong() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(&vec![b'A'; crate::MAX_BUFFERED_BYTES + 1]);

        let err = session.run(&mut pipe).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(pipe.output.is_empty());
        board.shutdown();
    }

    #[test]
    fn test_eof_without_terminator_still_gets_pong() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"ADD 1 1;");

        session.run(&mut pipe).unwrap();

        assert_eq!(pipe.output, ACK_MESSAGE.as_bytes());
        assert!(board.snapshot().unwrap().get(1, 1).unwrap().alive);
        board.shutdown();
    }

    #[test]
    fn test_out_of_bounds_add_is_a_silent_no_op() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"ADD 99 99;ADD -3 4;GET MAP;\r\n\r\n");

        session.run(&mut pipe).unwrap();

        let output = String::from_utf8(pipe.output).unwrap();
        let payload = output
            .strip_suffix(ACK_MESSAGE)
            .unwrap()
            .strip_suffix(';')
            .unwrap();
        assert_eq!(codec::decode(payload).unwrap().live_count(), 0);
        board.shutdown();
    }

    #[test]
    fn test_malformed_add_skips_record_and_continues() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"ADD one 2;ADD 3 4;\r\n\r\n");

        session.run(&mut pipe).unwrap();

        let snap = board.snapshot().unwrap();
        assert!(snap.get(3, 4).unwrap().alive);
        assert_eq!(snap.live_count(), 1);
        board.shutdown();
    }

    #[test]
    fn test_unknown_records_are_silently_ignored() {
        let board = paused_board();
        let session = Session::new(board.clone(), "test".into());
        let mut pipe = Pipe::new(b"PING;REMOVE 1 1;;\r\n\r\n");

        session.run(&mut pipe).unwrap();

        assert_eq!(pipe.output, ACK_MESSAGE.as_bytes());
        assert_eq!(board.snapshot().unwrap().live_count(), 0);
        board.shutdown();
    }
}
