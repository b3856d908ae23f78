//! [`HistoryStore`]: a cursor over a list of snapshots.

use motif_grid::Cell;

use crate::snapshot::Snapshot;

/// Linear undo/redo history with branch truncation.
///
/// Always holds at least one snapshot and keeps `0 <= cursor < len`.
///
/// # Examples
///
/// ```
/// use motif_history::HistoryStore;
///
/// let mut h = HistoryStore::new();
/// h.save_state(&[]);
/// assert!(h.can_undo());
/// assert!(h.undo().is_some());
/// assert!(h.undo().is_none());
/// ```
#[derive(Clone, Debug)]
pub struct HistoryStore {
    snapshots: Vec<Snapshot>,
    cursor: usize,
    max_depth: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    /// Unbounded history holding one empty snapshot.
    pub fn new() -> Self {
        Self::with_max_depth(0)
    }

    /// History that keeps at most `max_depth` snapshots, dropping the
    /// oldest first. `0` means unbounded.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            snapshots: vec![Snapshot::empty()],
            cursor: 0,
            max_depth,
        }
    }

    /// Record `cells` as the newest state.
    ///
    /// When the cursor is behind the newest snapshot, everything after it
    /// is discarded first.
    pub fn save_state(&mut self, cells: &[Cell]) {
        if self.cursor + 1 < self.snapshots.len() {
            let dropped = self.snapshots.len() - self.cursor - 1;
            self.snapshots.truncate(self.cursor + 1);
            tracing::debug!(dropped, "discarded redo branch");
        }
        self.snapshots.push(Snapshot::capture(cells));
        self.cursor = self.snapshots.len() - 1;

        if self.max_depth > 0 && self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
            self.cursor -= excess;
        }
    }

    /// Step back one snapshot and return it, or `None` at the oldest.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward one snapshot and return it, or `None` at the newest.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Replace the whole history with a single snapshot of `cells`.
    pub fn initialize_history(&mut self, cells: &[Cell]) {
        self.snapshots = vec![Snapshot::capture(cells)];
        self.cursor = 0;
    }

    /// Replace the whole history with a single empty snapshot.
    pub fn reset_history(&mut self) {
        self.initialize_history(&[]);
    }

    /// Whether [`undo`](Self::undo) would move.
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether [`redo`](Self::redo) would move.
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// The snapshot under the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    /// Every snapshot, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Number of snapshots held.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always `false`: the history holds at least one snapshot.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the current snapshot.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Configured depth bound, `0` when unbounded.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}
