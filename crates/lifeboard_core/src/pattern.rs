//! # Seed Patterns
//!
//! The fixed live-cell pattern applied to a fresh board at startup.

use crate::grid::{Grid, GridError};

/// The three-cell starter seed, an L at a hardcoded offset.
///
/// One step turns it into the 2x2 still-life block at `(2,2)..(3,3)`.
pub const STARTER: [(usize, usize); 3] = [(2, 2), (2, 3), (3, 2)];

/// Sets every listed cell alive.
///
/// # Errors
///
/// [`GridError::OutOfBounds`] if any seed coordinate falls outside the
/// grid. Seeding is a startup operation; a bad seed is surfaced, not
/// silently dropped like a client write.
pub fn apply(grid: &mut Grid, cells: &[(usize, usize)]) -> Result<(), GridError> {
    for &(x, y) in cells {
        grid.set(x, y, true)?;
    }
    Ok(())
}
