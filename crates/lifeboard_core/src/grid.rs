//! # Grid & Cell
//!
//! The 2D cell array shared by the simulation and the wire protocol.
//!
//! ## Design
//!
//! - Dimensions are fixed at construction and immutable thereafter
//! - Every access is bounds-checked; out-of-range is an error, never a clamp
//! - `snapshot` is the only sanctioned way to read a consistent whole grid
//! - Storage is a flat row-major `Vec`, indexed `x * size_y + y`

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// One cell of the board.
///
/// `last_changed` is carried in state and on the wire but plays no part in
/// the rule itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Whether the cell is alive this generation.
    pub alive: bool,
    /// Milliseconds since the Unix epoch at the last state change.
    pub last_changed: u64,
}

/// Errors from grid access and construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Coordinate outside `[0, size_x) x [0, size_y)`.
    #[error("cell ({x}, {y}) is outside the {size_x}x{size_y} grid")]
    OutOfBounds {
        /// Requested x coordinate.
        x: usize,
        /// Requested y coordinate.
        y: usize,
        /// Grid width.
        size_x: usize,
        /// Grid height.
        size_y: usize,
    },

    /// Row-form input had rows of differing lengths.
    #[error("ragged rows: expected {expected} cells per row, row {row} has {found}")]
    RaggedRows {
        /// Cells per row implied by the first row.
        expected: usize,
        /// Index of the offending row.
        row: usize,
        /// Cells actually present in that row.
        found: usize,
    },

    /// Row-form input had no rows or empty rows.
    #[error("grid rows must be non-empty")]
    EmptyRows,
}

/// A fixed-size rectangular board of [`Cell`]s.
///
/// The grid itself is plain data. Ownership arbitration between the tick
/// loop and connection handlers lives in `lifeboard_server`; nothing here
/// is synchronized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    /// Width (number of rows in the original row-major layout).
    size_x: usize,
    /// Height (cells per row).
    size_y: usize,
    /// Flat row-major cell storage, `size_x * size_y` long.
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of the given dimensions with every cell dead.
    #[must_use]
    pub fn new(size_x: usize, size_y: usize) -> Self {
        Self {
            size_x,
            size_y,
            cells: vec![Cell::default(); size_x * size_y],
        }
    }

    /// Returns the grid width.
    #[inline]
    #[must_use]
    pub const fn size_x(&self) -> usize {
        self.size_x
    }

    /// Returns the grid height.
    #[inline]
    #[must_use]
    pub const fn size_y(&self) -> usize {
        self.size_y
    }

    /// Returns true if `(x, y)` lies inside the grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, x: usize, y: usize) -> bool {
        x < self.size_x && y < self.size_y
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] if the coordinate is outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Result<Cell, GridError> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Sets the aliveness of the cell at `(x, y)`, stamping the change time.
    ///
    /// A write that does not change aliveness keeps the old timestamp.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] if the coordinate is outside the grid.
    pub fn set(&mut self, x: usize, y: usize, alive: bool) -> Result<(), GridError> {
        let stamp = epoch_millis();
        let i = self.index(x, y)?;
        if self.cells[i].alive != alive {
            self.cells[i] = Cell {
                alive,
                last_changed: stamp,
            };
        }
        Ok(())
    }

    /// Returns an immutable deep copy of the whole grid.
    ///
    /// This is the only consistent read path for simulation and
    /// serialization; callers must never serialize a grid they do not own.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// Returns the number of live cells.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|c| c.alive).count()
    }

    /// Converts the grid to its row-major row form, `size_x` rows of
    /// `size_y` cells each. This is the shape the wire codec serializes.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        (0..self.size_x)
            .map(|x| self.cells[x * self.size_y..(x + 1) * self.size_y].to_vec())
            .collect()
    }

    /// Rebuilds a grid from its row form.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyRows`] if there are no rows or rows are empty,
    /// [`GridError::RaggedRows`] if rows differ in length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let size_x = rows.len();
        let size_y = rows.first().map_or(0, Vec::len);
        if size_x == 0 || size_y == 0 {
            return Err(GridError::EmptyRows);
        }
        let mut cells = Vec::with_capacity(size_x * size_y);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != size_y {
                return Err(GridError::RaggedRows {
                    expected: size_y,
                    row,
                    found: cols.len(),
                });
            }
            cells.extend(cols);
        }
        Ok(Self {
            size_x,
            size_y,
            cells,
        })
    }

    /// Direct cell read for in-crate callers that have already proven the
    /// coordinate in bounds (the rule engine's inner loop).
    #[inline]
    pub(crate) fn cell_unchecked(&self, x: usize, y: usize) -> Cell {
        self.cells[x * self.size_y + y]
    }

    /// Direct cell write, same contract as [`Grid::cell_unchecked`].
    #[inline]
    pub(crate) fn put_unchecked(&mut self, x: usize, y: usize, cell: Cell) {
        let i = x * self.size_y + y;
        self.cells[i] = cell;
    }

    /// Maps a coordinate to its flat index, rejecting out-of-range input.
    fn index(&self, x: usize, y: usize) -> Result<usize, GridError> {
        if self.contains(x, y) {
            Ok(x * self.size_y + y)
        } else {
            Err(GridError::OutOfBounds {
                x,
                y,
                size_x: self.size_x,
                size_y: self.size_y,
            })
        }
    }
}

/// Milliseconds since the Unix epoch, used to stamp cell changes.
pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_dead() {
        let grid = Grid::new(20, 20);
        assert_eq!(grid.live_count(), 0);
        assert_eq!(grid.size_x(), 20);
        assert_eq!(grid.size_y(), 20);
    }

    #[test]
    fn test_set_and_get_round_trip() {
        let mut grid = Grid::new(4, 3);
        grid.set(3, 2, true).unwrap();
        assert!(grid.get(3, 2).unwrap().alive);
        assert!(!grid.get(0, 0).unwrap().alive);
        assert_eq!(grid.live_count(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_rejected_not_clamped() {
        let mut grid = Grid::new(20, 20);
        let err = grid.set(99, 99, true).unwrap_err();
        assert_eq!(
            err,
            GridError::OutOfBounds {
                x: 99,
                y: 99,
                size_x: 20,
                size_y: 20,
            }
        );
        assert!(grid.get(20, 0).is_err());
        assert!(grid.get(0, 20).is_err());
        assert_eq!(grid.live_count(), 0);
    }

    #[test]
    fn test_set_stamps_change_time_only_on_change() {
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, true).unwrap();
        let first = grid.get(0, 0).unwrap().last_changed;
        assert!(first > 0);

        // Re-asserting the same state keeps the original stamp.
        grid.set(0, 0, true).unwrap();
        assert_eq!(grid.get(0, 0).unwrap().last_changed, first);
    }

    #[test]
    fn test_snapshot_is_a_deep_copy() {
        let mut grid = Grid::new(3, 3);
        grid.set(1, 1, true).unwrap();
        let snap = grid.snapshot();
        grid.set(2, 2, true).unwrap();

        assert!(snap.get(1, 1).unwrap().alive);
        assert!(!snap.get(2, 2).unwrap().alive);
        assert!(grid.get(2, 2).unwrap().alive);
    }

    #[test]
    fn test_rows_round_trip() {
        let mut grid = Grid::new(3, 5);
        grid.set(0, 4, true).unwrap();
        grid.set(2, 0, true).unwrap();

        let rebuilt = Grid::from_rows(grid.rows()).unwrap();
        assert_eq!(rebuilt, grid);
    }

    #[test]
    fn test_from_rows_rejects_ragged_input() {
        let rows = vec![vec![Cell::default(); 3], vec![Cell::default(); 2]];
        let err = Grid::from_rows(rows).unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRows {
                expected: 3,
                row: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn test_from_rows_rejects_empty_input() {
        assert_eq!(Grid::from_rows(Vec::new()).unwrap_err(), GridError::EmptyRows);
        assert_eq!(
            Grid::from_rows(vec![Vec::new()]).unwrap_err(),
            GridError::EmptyRows
        );
    }
}
