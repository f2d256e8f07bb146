//! # The Life Rule
//!
//! Standard Conway B3/S23 over the Moore neighborhood, non-toroidal.
//!
//! ## Design
//!
//! - `step` reads only the pre-step grid; the next generation is built in a
//!   separate allocation so a pass can never observe its own writes
//! - The rule keeps the original three-way branch: exactly 3 births, outside
//!   [2, 3] kills, exactly 2 passes the current state through unchanged
//! - Edges have fewer neighbors; nothing wraps around

use crate::grid::{epoch_millis, Cell, Grid};

/// Relative offsets of the Moore neighborhood.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Computes the next generation of `current`.
///
/// Returns a brand-new grid of the same dimensions. Cells whose aliveness
/// changed are stamped with the step time; unchanged cells keep their
/// previous timestamp. Publishing the result atomically is the caller's
/// job.
#[must_use]
pub fn step(current: &Grid) -> Grid {
    let stamp = epoch_millis();
    let mut next = current.snapshot();
    for x in 0..current.size_x() {
        for y in 0..current.size_y() {
            let cell = current.cell_unchecked(x, y);
            let alive = next_alive(current, x, y, cell.alive);
            if alive != cell.alive {
                next.put_unchecked(
                    x,
                    y,
                    Cell {
                        alive,
                        last_changed: stamp,
                    },
                );
            }
        }
    }
    next
}

/// Counts live in-bounds Moore neighbors of `(x, y)`.
///
/// Positions beyond a grid edge do not exist and never count.
#[must_use]
pub fn live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    let mut count = 0;
    for (dx, dy) in NEIGHBOR_OFFSETS {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || ny < 0 {
            continue;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if grid.contains(nx, ny) && grid.cell_unchecked(nx, ny).alive {
            count += 1;
        }
    }
    count
}

/// The three-way rule branch, applied to one cell.
fn next_alive(grid: &Grid, x: usize, y: usize, currently_alive: bool) -> bool {
    let n = live_neighbors(grid, x, y);
    if n == 3 {
        true
    } else if n > 3 || n < 2 {
        false
    } else {
        currently_alive
    }
}
