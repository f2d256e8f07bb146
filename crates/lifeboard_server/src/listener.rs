//! # Connection Acceptor
//!
//! TCP listener spawning one session thread per accepted connection.
//!
//! ## Design
//!
//! - A failed bind is fatal: the service has no recovery path without its
//!   socket, so the error is returned and the process exits
//! - A failed accept is NOT fatal: it is logged and the loop continues
//!   (the historical service would have died here; that was a bug, not a
//!   contract)
//! - Sessions are independent: one connection's I/O error never touches
//!   another connection or the simulation

use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use crate::config::ServerConfig;
use crate::session::Session;
use crate::state::BoardHandle;

/// Errors from server setup.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The listen socket could not be bound. Fail-fast, not retried.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was attempted.
        addr: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// The TCP acceptor.
#[derive(Debug)]
pub struct Server {
    /// Bound listen socket.
    listener: TcpListener,
    /// Handle cloned into every session.
    board: BoardHandle,
    /// Sessions currently running.
    active_sessions: Arc<AtomicU64>,
    /// Connections accepted since startup.
    accepted: u64,
}

impl Server {
    /// Binds the listen socket.
    ///
    /// # Errors
    ///
    /// [`ServerError::Bind`] if the port is unavailable; the caller must
    /// treat this as fatal.
    pub fn bind(config: &ServerConfig, board: BoardHandle) -> Result<Self, ServerError> {
        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;
        tracing::info!("listening on {addr}");
        Ok(Self {
            listener,
            board,
            active_sessions: Arc::new(AtomicU64::new(0)),
            accepted: 0,
        })
    }

    /// Returns the bound local address (useful with port 0).
    ///
    /// # Errors
    ///
    /// Propagates the socket's own error.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns the number of sessions currently running.
    #[must_use]
    pub fn active_sessions(&self) -> u64 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    /// Runs the accept loop forever.
    ///
    /// Each accepted connection gets its own named thread running a
    /// [`Session`]. Accept errors are logged and the loop continues.
    pub fn run(mut self) {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    self.accepted += 1;
                    self.spawn_session(stream, peer);
                }
                Err(err) => {
                    // A transient accept error must not kill the service.
                    tracing::warn!("accept failed: {err}");
                }
            }
        }
    }

    /// Spawns the per-connection session thread.
    fn spawn_session(&self, mut stream: std::net::TcpStream, peer: SocketAddr) {
        let session = Session::new(self.board.clone(), peer.to_string());
        let active = Arc::clone(&self.active_sessions);
        let id = self.accepted;

        active.fetch_add(1, Ordering::Relaxed);
        tracing::info!("connection {id} from {peer}");

        let spawned = std::thread::Builder::new()
            .name(format!("lifeboard-conn-{id}"))
            .spawn(move || {
                if let Err(err) = session.run(&mut stream) {
                    tracing::warn!("session {peer} ended with error: {err}");
                }
                active.fetch_sub(1, Ordering::Relaxed);
            });

        if let Err(err) = spawned {
            // The session never started; undo the accounting.
            self.active_sessions.fetch_sub(1, Ordering::Relaxed);
            tracing::warn!("failed to spawn session thread for {peer}: {err}");
        }
    }
}
