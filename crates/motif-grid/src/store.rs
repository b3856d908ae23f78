//! [`GridStore`]: the authoritative set of grid cells.
//!
//! Cells are kept in insertion order. Replacing a cell keeps its slot;
//! removing one closes the gap. Nothing in the store captures history;
//! callers snapshot explicitly.

use crossbeam_channel::{Receiver, Sender};
use indexmap::IndexMap;
use motif_core::{GridGeneration, GridPos, Sequence};
use smallvec::SmallVec;

use crate::bounds::GridBounds;
use crate::cell::Cell;
use crate::error::GridError;

/// Describes one successful grid mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridChange {
    /// A cell was inserted or fully replaced.
    Placed {
        /// Position of the cell.
        pos: GridPos,
        /// Loading flag of the new cell.
        is_loading: bool,
        /// Whether an existing cell was replaced.
        replaced: bool,
    },
    /// An existing cell's sequence and loading flag were rewritten.
    Updated {
        /// Position of the cell.
        pos: GridPos,
        /// New loading flag.
        is_loading: bool,
    },
    /// Cells were deleted.
    Removed {
        /// Positions that actually held a cell.
        positions: SmallVec<[GridPos; 4]>,
    },
    /// Every cell was deleted.
    Cleared {
        /// Generation after the clear.
        generation: GridGeneration,
    },
    /// The whole grid was replaced from a snapshot.
    Restored {
        /// Number of cells now on the grid.
        cells: usize,
        /// Generation after the restore.
        generation: GridGeneration,
    },
}

/// Owns every cell on a bounded grid.
///
/// # Examples
///
/// ```
/// use motif_core::GridPos;
/// use motif_grid::{GridBounds, GridStore};
///
/// let mut grid = GridStore::new(GridBounds::new(11, 7).unwrap());
/// grid.initialize_grid();
/// let seed = grid.get_square_at_position(GridPos::new(5, 3)).unwrap();
/// assert!(seed.first_square);
///
/// assert!(grid.place_square(GridPos::new(11, 0), None, false).is_err());
/// assert_eq!(grid.len(), 1);
/// ```
pub struct GridStore {
    bounds: GridBounds,
    cells: IndexMap<GridPos, Cell>,
    revision: u64,
    generation: GridGeneration,
    subscribers: Vec<Sender<GridChange>>,
}

impl GridStore {
    /// An empty grid with the given bounds.
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: IndexMap::new(),
            revision: 0,
            generation: GridGeneration::default(),
            subscribers: Vec::new(),
        }
    }

    /// The grid extent.
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Number of occupied positions.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no position is occupied.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Counter bumped by every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Token advanced by whole-board replacement (clear or restore).
    pub fn generation(&self) -> GridGeneration {
        self.generation
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Deep copy of every cell, in insertion order.
    pub fn snapshot_cells(&self) -> Vec<Cell> {
        self.cells.values().cloned().collect()
    }

    /// The cell at `pos`, if any.
    pub fn get_square_at_position(&self, pos: GridPos) -> Option<&Cell> {
        self.cells.get(&pos)
    }

    /// Whether `pos` holds a cell.
    pub fn is_occupied(&self, pos: GridPos) -> bool {
        self.cells.contains_key(&pos)
    }

    /// The only cell, when exactly one exists.
    pub fn sole_cell(&self) -> Option<&Cell> {
        match self.cells.len() {
            1 => self.cells.values().next(),
            _ => None,
        }
    }

    /// Whether any cell is still waiting for a generated sequence.
    pub fn has_pending(&self) -> bool {
        self.cells.values().any(|c| c.is_loading)
    }

    /// Receive every future [`GridChange`].
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<GridChange> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Insert a cell at `pos`, or fully replace the cell already there.
    ///
    /// Out-of-bounds positions are rejected with a warning and leave the
    /// grid untouched. The new cell is marked `first_square` when the grid
    /// was empty.
    pub fn place_square(
        &mut self,
        pos: GridPos,
        sequence: Option<Sequence>,
        is_loading: bool,
    ) -> Result<GridChange, GridError> {
        if !self.bounds.contains(pos) {
            let err = GridError::OutOfBounds {
                pos,
                cols: self.bounds.cols(),
                rows: self.bounds.rows(),
            };
            tracing::warn!(%pos, "{err}");
            return Err(err);
        }
        let cell = Cell {
            pos,
            sequence,
            is_loading,
            first_square: self.cells.is_empty(),
        };
        let replaced = self.cells.insert(pos, cell).is_some();
        Ok(self.commit(GridChange::Placed {
            pos,
            is_loading,
            replaced,
        }))
    }

    /// Rewrite the sequence and loading flag of the cell at `pos`.
    ///
    /// A missing cell is reported with a warning; nothing is created.
    pub fn update_square(
        &mut self,
        pos: GridPos,
        sequence: Option<Sequence>,
        is_loading: bool,
    ) -> Result<GridChange, GridError> {
        let Some(cell) = self.cells.get_mut(&pos) else {
            let err = GridError::NoCell { pos };
            tracing::warn!(%pos, "{err}");
            return Err(err);
        };
        cell.sequence = sequence;
        cell.is_loading = is_loading;
        Ok(self.commit(GridChange::Updated { pos, is_loading }))
    }

    /// Delete the cell at `pos`. Returns `None` when there was none.
    pub fn remove_square(&mut self, pos: GridPos) -> Option<GridChange> {
        self.remove_squares(&[pos])
    }

    /// Delete every cell whose position is listed. Absent positions are
    /// ignored; returns `None` when nothing was removed.
    pub fn remove_squares(&mut self, positions: &[GridPos]) -> Option<GridChange> {
        let removed: SmallVec<[GridPos; 4]> = positions
            .iter()
            .copied()
            .filter(|pos| self.cells.shift_remove(pos).is_some())
            .collect();
        if removed.is_empty() {
            return None;
        }
        Some(self.commit(GridChange::Removed { positions: removed }))
    }

    /// Delete every cell and advance the generation.
    pub fn clear_grid(&mut self) -> GridChange {
        self.cells.clear();
        self.generation = self.generation.next();
        self.commit(GridChange::Cleared {
            generation: self.generation,
        })
    }

    /// Reset to the start state: an empty grid with one blank cell at the
    /// center.
    pub fn initialize_grid(&mut self) {
        self.clear_grid();
        let center = self.bounds.center();
        if let Err(err) = self.place_square(center, None, false) {
            tracing::warn!("failed to place initial cell: {err}");
        }
    }

    /// Replace all content with `cells` and advance the generation.
    ///
    /// Cells outside the bounds are skipped with a warning. Later cells at
    /// a duplicate position replace earlier ones. Flags are kept as stored.
    pub fn restore<I>(&mut self, cells: I) -> GridChange
    where
        I: IntoIterator<Item = Cell>,
    {
        self.cells.clear();
        for cell in cells {
            if !self.bounds.contains(cell.pos) {
                tracing::warn!(pos = %cell.pos, "skipping out-of-bounds cell during restore");
                continue;
            }
            self.cells.insert(cell.pos, cell);
        }
        self.generation = self.generation.next();
        self.commit(GridChange::Restored {
            cells: self.cells.len(),
            generation: self.generation,
        })
    }

    fn commit(&mut self, change: GridChange) -> GridChange {
        self.revision += 1;
        self.subscribers
            .retain(|tx| tx.send(change.clone()).is_ok());
        change
    }
}

impl std::fmt::Debug for GridStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridStore")
            .field("bounds", &self.bounds)
            .field("cells", &self.cells.len())
            .field("revision", &self.revision)
            .field("generation", &self.generation)
            .finish()
    }
}
