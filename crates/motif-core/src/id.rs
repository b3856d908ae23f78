//! Strongly-typed identifiers and the [`GridPos`] coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::direction::Direction;

/// An integer cell coordinate on the grid.
///
/// `x` is the column and `y` the row, both zero-based. Positions are
/// signed so that offsets computed during a pull may step outside the
/// grid before being clamped back by the grid bounds.
///
/// # Examples
///
/// ```
/// use motif_core::{Direction, GridPos};
///
/// let p = GridPos::new(5, 3);
/// assert_eq!(p.step(Direction::Left, 2), GridPos::new(3, 3));
/// assert_eq!(p.cell_id(), "3-5");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl GridPos {
    /// Create a position from a column and a row.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position `distance` cells away in `direction`, saturating at
    /// the `i32` range.
    pub fn step(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx.saturating_mul(distance)),
            y: self.y.saturating_add(dy.saturating_mul(distance)),
        }
    }

    /// The persisted cell id, formatted as `"<y>-<x>"`.
    pub fn cell_id(self) -> String {
        format!("{}-{}", self.y, self.x)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Tracks whole-board replacements of a grid.
///
/// Advanced every time the grid is cleared or restored from a snapshot.
/// Pending service requests remember the generation they were issued
/// against; a reply that arrives after the generation moved on is stale
/// and must not be written into the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridGeneration(pub u64);

impl GridGeneration {
    /// The generation that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for GridGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GridGeneration {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies one request sent to the sequence service worker.
///
/// Allocated sequentially by the worker handle; replies carry the id of
/// the request they answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_along_each_direction() {
        let p = GridPos::new(5, 3);
        assert_eq!(p.step(Direction::Left, 3), GridPos::new(2, 3));
        assert_eq!(p.step(Direction::Right, 3), GridPos::new(8, 3));
        assert_eq!(p.step(Direction::Up, 3), GridPos::new(5, 0));
        assert_eq!(p.step(Direction::Down, 3), GridPos::new(5, 6));
    }

    #[test]
    fn step_saturates_instead_of_overflowing() {
        let p = GridPos::new(5, 3);
        assert_eq!(p.step(Direction::Right, i32::MAX), GridPos::new(i32::MAX, 3));
        assert_eq!(p.step(Direction::Up, i32::MAX), GridPos::new(5, i32::MIN + 3));
        assert_eq!(
            GridPos::new(i32::MIN, 0).step(Direction::Left, i32::MAX),
            GridPos::new(i32::MIN, 0)
        );
    }

    #[test]
    fn cell_id_is_row_then_column() {
        assert_eq!(GridPos::new(10, 0).cell_id(), "0-10");
    }

    #[test]
    fn generation_next_is_monotonic() {
        let g = GridGeneration::default();
        assert_eq!(g, GridGeneration(0));
        assert!(g.next() > g);
    }
}
