//! # Wire Codec
//!
//! JSON encoding of whole-grid snapshots for `GET MAP`.
//!
//! ## Format
//!
//! A row-major array of rows, each cell an object with fields in declared
//! order, so the encoding is byte-stable for a given grid:
//!
//! ```json
//! [[{"alive":true,"last_changed":1700000000000}, ...], ...]
//! ```
//!
//! On the wire the payload is followed by a single `;` byte, written by
//! the session, not the codec.

use thiserror::Error;

use lifeboard_core::{Cell, Grid, GridError};

/// Errors from decoding a grid payload.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The payload was not valid JSON for the row form.
    #[error("malformed grid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The rows did not describe a rectangular, non-empty grid.
    #[error("inconsistent grid payload: {0}")]
    Shape(#[from] GridError),
}

/// Encodes a grid snapshot as JSON.
///
/// # Errors
///
/// [`serde_json::Error`] on serialization failure; with this data model
/// that does not happen in practice, but the session treats it as an I/O
/// failure rather than unwrap.
pub fn encode(grid: &Grid) -> Result<String, serde_json::Error> {
    serde_json::to_string(&grid.rows())
}

/// Decodes a JSON payload back into a grid.
///
/// # Errors
///
/// [`CodecError::Json`] for malformed JSON, [`CodecError::Shape`] for
/// ragged or empty rows.
pub fn decode(payload: &str) -> Result<Grid, CodecError> {
    let rows: Vec<Vec<Cell>> = serde_json::from_str(payload)?;
    Ok(Grid::from_rows(rows)?)
}
