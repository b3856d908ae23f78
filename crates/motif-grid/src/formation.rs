//! 2×2 formation detection.
//!
//! A formation is any fully-occupied 2×2 block of cells. Formations are
//! derived data: they are recomputed from the grid and never stored in
//! history.

use motif_core::GridPos;

use crate::cell::Cell;
use crate::store::GridStore;

/// A fully-occupied 2×2 block.
#[derive(Clone, Debug, PartialEq)]
pub struct Formation {
    /// Top-left position of the block.
    pub origin: GridPos,
    /// Copies of the four cells ordered top-left, top-right, bottom-left,
    /// bottom-right.
    pub corners: [Cell; 4],
}

impl Formation {
    /// Visual center of the block, `(x + 0.5, y + 0.5)`.
    pub fn anchor(&self) -> (f64, f64) {
        (f64::from(self.origin.x) + 0.5, f64::from(self.origin.y) + 0.5)
    }

    /// Top-left corner.
    pub fn top_left(&self) -> &Cell {
        &self.corners[0]
    }

    /// Top-right corner.
    pub fn top_right(&self) -> &Cell {
        &self.corners[1]
    }

    /// Bottom-left corner.
    pub fn bottom_left(&self) -> &Cell {
        &self.corners[2]
    }

    /// Bottom-right corner.
    pub fn bottom_right(&self) -> &Cell {
        &self.corners[3]
    }

    /// Whether every corner carries a sequence.
    pub fn is_complete(&self) -> bool {
        self.corners.iter().all(Cell::has_sequence)
    }

    /// Positions of corners that carry no sequence.
    pub fn missing_corners(&self) -> Vec<GridPos> {
        self.corners
            .iter()
            .filter(|c| !c.has_sequence())
            .map(|c| c.pos)
            .collect()
    }
}

/// Scan the whole grid for formations.
///
/// Origins are visited row-major (`y` outer, `x` inner) over
/// `0 <= x < cols - 1`, `0 <= y < rows - 1`.
pub fn detect_formations(grid: &GridStore) -> Vec<Formation> {
    let bounds = grid.bounds();
    let max_x = bounds.cols() as i32 - 1;
    let max_y = bounds.rows() as i32 - 1;
    let mut out = Vec::new();
    for y in 0..max_y {
        for x in 0..max_x {
            let quad = [
                GridPos::new(x, y),
                GridPos::new(x + 1, y),
                GridPos::new(x, y + 1),
                GridPos::new(x + 1, y + 1),
            ];
            let (Some(tl), Some(tr), Some(bl), Some(br)) = (
                grid.get_square_at_position(quad[0]),
                grid.get_square_at_position(quad[1]),
                grid.get_square_at_position(quad[2]),
                grid.get_square_at_position(quad[3]),
            ) else {
                continue;
            };
            out.push(Formation {
                origin: quad[0],
                corners: [tl.clone(), tr.clone(), bl.clone(), br.clone()],
            });
        }
    }
    out
}

/// Caches the formations of a grid, rescanning only when its revision
/// changes.
#[derive(Debug, Default)]
pub struct FormationDetector {
    cached: Vec<Formation>,
    revision: Option<u64>,
    scans: u64,
}

impl FormationDetector {
    /// A detector with nothing cached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current formations of `grid`.
    pub fn formations(&mut self, grid: &GridStore) -> &[Formation] {
        if self.revision != Some(grid.revision()) {
            self.cached = detect_formations(grid);
            self.revision = Some(grid.revision());
            self.scans += 1;
        }
        &self.cached
    }

    /// The formation whose top-left corner is `origin`, if present.
    pub fn formation_at(&mut self, grid: &GridStore, origin: GridPos) -> Option<&Formation> {
        self.formations(grid).iter().find(|f| f.origin == origin)
    }

    /// Forget the cache; the next query rescans.
    pub fn invalidate(&mut self) {
        self.revision = None;
    }

    /// Number of full scans performed so far.
    pub fn scans(&self) -> u64 {
        self.scans
    }
}
