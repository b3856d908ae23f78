//! Error types for grid operations.

use motif_core::GridPos;
use std::fmt;

/// Errors arising from grid construction or cell mutation.
///
/// Mutation errors are validation failures: the store logs them and
/// leaves its contents untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A position lies outside the grid.
    OutOfBounds {
        /// The offending position.
        pos: GridPos,
        /// Number of columns in the grid.
        cols: u32,
        /// Number of rows in the grid.
        rows: u32,
    },
    /// An update targeted a position that holds no cell.
    NoCell {
        /// The empty position.
        pos: GridPos,
    },
    /// Attempted to construct a grid with zero columns or rows.
    EmptyGrid {
        /// Requested columns.
        cols: u32,
        /// Requested rows.
        rows: u32,
    },
    /// A dimension exceeds what signed coordinates can address.
    DimensionTooLarge {
        /// Which dimension (`"cols"` or `"rows"`).
        name: &'static str,
        /// The requested size.
        value: u32,
        /// The maximum allowed size.
        max: u32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds { pos, cols, rows } => write!(
                f,
                "invalid position {pos}: must be within {cols} columns and {rows} rows"
            ),
            Self::NoCell { pos } => write!(f, "no cell at position {pos} to update"),
            Self::EmptyGrid { cols, rows } => {
                write!(f, "grid must have at least one cell, got {cols}x{rows}")
            }
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
        }
    }
}

impl std::error::Error for GridError {}
