//! Grid cells.

use motif_core::{GridPos, Sequence};

/// One occupied grid position.
///
/// A cell with `sequence == None` and `is_loading == true` is a
/// placeholder waiting for a generated sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Where the cell sits. At most one cell exists per position.
    pub pos: GridPos,
    /// The sequence carried by the cell, if any.
    pub sequence: Option<Sequence>,
    /// Whether a generated sequence is still pending for this cell.
    pub is_loading: bool,
    /// Set when the cell was placed into an empty grid.
    pub first_square: bool,
}

impl Cell {
    /// A settled cell carrying `sequence`.
    pub fn new(pos: GridPos, sequence: Option<Sequence>) -> Self {
        Self {
            pos,
            sequence,
            is_loading: false,
            first_square: false,
        }
    }

    /// A loading placeholder with no sequence.
    pub fn placeholder(pos: GridPos) -> Self {
        Self {
            pos,
            sequence: None,
            is_loading: true,
            first_square: false,
        }
    }

    /// Column.
    pub fn x(&self) -> i32 {
        self.pos.x
    }

    /// Row.
    pub fn y(&self) -> i32 {
        self.pos.y
    }

    /// Whether the cell carries a sequence.
    pub fn has_sequence(&self) -> bool {
        self.sequence.is_some()
    }
}
