//! # Lifeboard Core - The Simulation
//!
//! Pure Game of Life state and rules.
//!
//! This crate knows nothing about sockets, ticks, or threads. It owns:
//!
//! - **Grid**: a fixed-size 2D array of cells with bounds-checked access
//! - **Rule**: the B3/S23 step function over the Moore neighborhood
//! - **Seeds**: the starter pattern applied at process start
//!
//! ## Boundary Semantics
//!
//! The grid is NOT toroidal. Cells beyond an edge simply do not exist and
//! never count as neighbors; edge and corner cells have fewer neighbors.
//!
//! ## Consistency Model
//!
//! `step` reads only the pre-step grid and returns a brand-new grid. The
//! caller is responsible for publishing the result atomically. Within this
//! crate there is no shared state at all.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod grid;
pub mod life;
pub mod pattern;

pub use grid::{Cell, Grid, GridError};
pub use life::{live_neighbors, step};
