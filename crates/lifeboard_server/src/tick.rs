//! # Tick Source
//!
//! The fixed-interval channel that drives the simulation.
//!
//! ## Design
//!
//! - `crossbeam_channel::tick` gives simple periodic-timer semantics: no
//!   drift correction, best effort when a step runs long
//! - Steps can never overlap regardless of timing because the board actor
//!   consumes ticks from a single thread
//! - A paused source (a channel that never fires) lets tests and tools run
//!   a board whose state only changes through commands

use crossbeam_channel::{never, tick, Receiver};
use std::time::{Duration, Instant};

/// A source of tick events for the board actor.
pub struct TickSource {
    /// Channel that yields once per interval (or never).
    rx: Receiver<Instant>,
    /// Configured interval; `None` when paused.
    interval: Option<Duration>,
}

impl TickSource {
    /// Creates a source firing once per `interval`.
    #[must_use]
    pub fn periodic(interval: Duration) -> Self {
        Self {
            rx: tick(interval),
            interval: Some(interval),
        }
    }

    /// Creates a source that never fires.
    #[must_use]
    pub fn paused() -> Self {
        Self {
            rx: never(),
            interval: None,
        }
    }

    /// Returns true if this source will never fire.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.interval.is_none()
    }

    /// Returns the configured interval, if any.
    #[must_use]
    pub const fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// The underlying channel, for the actor's `select!` loop.
    #[must_use]
    pub(crate) const fn receiver(&self) -> &Receiver<Instant> {
        &self.rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_periodic_source_fires() {
        let source = TickSource::periodic(Duration::from_millis(5));
        assert!(!source.is_paused());
        assert_eq!(source.interval(), Some(Duration::from_millis(5)));
        assert!(source
            .receiver()
            .recv_timeout(Duration::from_millis(500))
            .is_ok());
    }

    #[test]
    fn test_paused_source_never_fires() {
        let source = TickSource::paused();
        assert!(source.is_paused());
        assert!(source
            .receiver()
            .recv_timeout(Duration::from_millis(20))
            .is_err());
    }
}
