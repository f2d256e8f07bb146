//! # Board Actor
//!
//! The single owner of the shared grid.
//!
//! ## Design
//!
//! - One dedicated thread owns the `Grid`; nobody else ever touches it
//! - All reads and writes arrive as commands over a channel and are
//!   serialized through one `select!` loop together with tick events
//! - A snapshot is therefore always a whole generation, and a point write
//!   lands either wholly before or wholly after any tick
//!
//! The raw grid is never exposed; [`BoardHandle`] is the only way in.

use crossbeam_channel::{bounded, select, unbounded, Sender};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

use lifeboard_core::{life, Grid};

use crate::tick::TickSource;

/// Callback invoked with the new grid after every completed tick.
///
/// This is the display hook: the actor calls out at a defined point, the
/// collaborator (terminal renderer, status line) decides what to do.
pub type GenerationHook = Box<dyn Fn(&Grid) + Send>;

/// The board actor has shut down; no further commands can be served.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("board actor has shut down")]
pub struct BoardGone;

/// Commands accepted by the board actor.
enum BoardCommand {
    /// Set one cell alive (the `ADD` path; never kills).
    SetAlive {
        /// Cell x coordinate.
        x: usize,
        /// Cell y coordinate.
        y: usize,
    },
    /// Reply with a deep copy of the current grid.
    Snapshot {
        /// Single-use reply channel.
        reply: Sender<Grid>,
    },
    /// Publish a whole new grid.
    Replace(Grid),
    /// Stop the actor thread.
    Shutdown,
}

/// Cloneable handle to the board actor.
///
/// Dropping every handle shuts the actor down.
#[derive(Clone, Debug)]
pub struct BoardHandle {
    /// Command channel into the actor.
    tx: Sender<BoardCommand>,
    /// Grid width, for protocol-boundary bounds checks.
    size_x: usize,
    /// Grid height.
    size_y: usize,
    /// Completed generations.
    generation: Arc<AtomicU64>,
    /// Write commands applied to the grid.
    commands_applied: Arc<AtomicU64>,
}

impl BoardHandle {
    /// Spawns the board actor thread owning `grid`, driven by `ticks`.
    ///
    /// `hook`, when present, is called with the new grid after every tick.
    #[must_use]
    pub fn spawn(grid: Grid, ticks: TickSource, hook: Option<GenerationHook>) -> Self {
        let (tx, rx) = unbounded();
        let generation = Arc::new(AtomicU64::new(0));
        let commands_applied = Arc::new(AtomicU64::new(0));
        let handle = Self {
            tx,
            size_x: grid.size_x(),
            size_y: grid.size_y(),
            generation: Arc::clone(&generation),
            commands_applied: Arc::clone(&commands_applied),
        };

        // Thread spawn only fails under resource exhaustion at startup.
        std::thread::Builder::new()
            .name("lifeboard-board".into())
            .spawn(move || {
                let mut grid = grid;
                loop {
                    select! {
                        recv(ticks.receiver()) -> msg => {
                            if msg.is_err() {
                                continue;
                            }
                            grid = life::step(&grid);
                            generation.fetch_add(1, Ordering::Relaxed);
                            if let Some(hook) = &hook {
                                hook(&grid);
                            }
                        }
                        recv(rx) -> msg => match msg {
                            Ok(BoardCommand::SetAlive { x, y }) => {
                                // Bounds were checked at the protocol layer;
                                // the actor re-checks and drops the write.
                                match grid.set(x, y, true) {
                                    Ok(()) => {
                                        commands_applied.fetch_add(1, Ordering::Relaxed);
                                    }
                                    Err(err) => {
                                        tracing::debug!("dropping write: {err}");
                                    }
                                }
                            }
                            Ok(BoardCommand::Snapshot { reply }) => {
                                let _ = reply.send(grid.snapshot());
                            }
                            Ok(BoardCommand::Replace(next)) => {
                                grid = next;
                                commands_applied.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(BoardCommand::Shutdown) | Err(_) => break,
                        },
                    }
                }
                tracing::debug!("board actor stopped");
            })
            .expect("spawn board actor thread");

        handle
    }

    /// Returns the board dimensions as `(size_x, size_y)`.
    #[inline]
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.size_x, self.size_y)
    }

    /// Returns the number of completed generations.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Returns the number of write commands (`SetAlive`, `Replace`) the
    /// actor has applied. Dropped out-of-bounds writes do not count.
    #[inline]
    #[must_use]
    pub fn commands_applied(&self) -> u64 {
        self.commands_applied.load(Ordering::Relaxed)
    }

    /// Sets the cell at `(x, y)` alive.
    ///
    /// # Errors
    ///
    /// [`BoardGone`] if the actor has shut down.
    pub fn set_alive(&self, x: usize, y: usize) -> Result<(), BoardGone> {
        self.tx
            .send(BoardCommand::SetAlive { x, y })
            .map_err(|_| BoardGone)
    }

    /// Returns a fully consistent deep copy of the current grid.
    ///
    /// # Errors
    ///
    /// [`BoardGone`] if the actor has shut down.
    pub fn snapshot(&self) -> Result<Grid, BoardGone> {
        let (reply, rx) = bounded(1);
        self.tx
            .send(BoardCommand::Snapshot { reply })
            .map_err(|_| BoardGone)?;
        rx.recv().map_err(|_| BoardGone)
    }

    /// Atomically publishes `next` as the new board state.
    ///
    /// # Errors
    ///
    /// [`BoardGone`] if the actor has shut down.
    pub fn replace(&self, next: Grid) -> Result<(), BoardGone> {
        self.tx
            .send(BoardCommand::Replace(next))
            .map_err(|_| BoardGone)
    }

    /// Asks the actor thread to stop. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.tx.send(BoardCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lifeboard_core::pattern;
    use std::time::Duration;

    #[test]
    fn test_paused_board_only_changes_through_commands() {
        let board = BoardHandle::spawn(Grid::new(20, 20), TickSource::paused(), None);
        board.set_alive(4, 5).unwrap();

        let snap = board.snapshot().unwrap();
        assert!(snap.get(4, 5).unwrap().alive);
        assert_eq!(snap.live_count(), 1);
        assert_eq!(board.generation(), 0);
        board.shutdown();
    }

    #[test]
    fn test_concurrent_adds_are_never_lost() {
        let board = BoardHandle::spawn(Grid::new(20, 20), TickSource::paused(), None);

        let writers: Vec<_> = (0..8)
            .map(|x| {
                let board = board.clone();
                std::thread::spawn(move || {
                    for y in 0..20 {
                        board.set_alive(x, y).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let snap = board.snapshot().unwrap();
        assert_eq!(snap.live_count(), 8 * 20);
        assert_eq!(board.commands_applied(), 8 * 20);
        board.shutdown();
    }

    #[test]
    fn test_out_of_bounds_write_is_dropped_silently() {
        let board = BoardHandle::spawn(Grid::new(20, 20), TickSource::paused(), None);
        board.set_alive(99, 99).unwrap();

        assert_eq!(board.snapshot().unwrap().live_count(), 0);
        assert_eq!(board.commands_applied(), 0);
        board.shutdown();
    }

    #[test]
    fn test_ticks_advance_generations() {
        let mut grid = Grid::new(20, 20);
        pattern::apply(&mut grid, &pattern::STARTER).unwrap();

        let board = BoardHandle::spawn(
            grid,
            TickSource::periodic(Duration::from_millis(10)),
            None,
        );
        std::thread::sleep(Duration::from_millis(120));

        assert!(board.generation() >= 1);
        // The starter L stabilizes to the 2x2 block after one tick.
        assert_eq!(board.snapshot().unwrap().live_count(), 4);
        board.shutdown();
    }

    #[test]
    fn test_generation_hook_observes_every_tick() {
        let (seen_tx, seen_rx) = unbounded();
        let hook: GenerationHook = Box::new(move |grid: &Grid| {
            let _ = seen_tx.send(grid.live_count());
        });

        let mut grid = Grid::new(10, 10);
        pattern::apply(&mut grid, &pattern::STARTER).unwrap();
        let board = BoardHandle::spawn(
            grid,
            TickSource::periodic(Duration::from_millis(10)),
            Some(hook),
        );

        let first = seen_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first, 4);
        board.shutdown();
    }

    #[test]
    fn test_replace_publishes_whole_grid() {
        let board = BoardHandle::spawn(Grid::new(5, 5), TickSource::paused(), None);
        let mut next = Grid::new(5, 5);
        next.set(0, 0, true).unwrap();
        board.replace(next.clone()).unwrap();

        assert_eq!(board.snapshot().unwrap(), next);
        assert_eq!(board.commands_applied(), 1);
        board.shutdown();
    }

    #[test]
    fn test_handle_reports_board_gone_after_shutdown() {
        let board = BoardHandle::spawn(Grid::new(5, 5), TickSource::paused(), None);
        board.shutdown();

        // The actor drains in-flight commands before exiting, so poll until
        // the channel disconnects.
        for _ in 0..100 {
            if board.snapshot().is_err() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("board never shut down");
    }
}
