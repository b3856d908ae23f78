//! Immutable grid snapshots and their persisted form.

use motif_core::{GridPos, Sequence};
use motif_grid::Cell;
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;
use crate::hash::snapshot_fingerprint;

/// A cell in its persisted shape.
///
/// ```json
/// { "id": "3-5", "x": 5, "y": 3, "sequence": null, "isLoading": false }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCell {
    /// `"<y>-<x>"`.
    pub id: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// The cell's sequence, `null` for blank cells and placeholders.
    pub sequence: Option<Sequence>,
    /// Whether the cell was waiting for a generated sequence.
    #[serde(default)]
    pub is_loading: bool,
}

impl From<&Cell> for PersistedCell {
    fn from(cell: &Cell) -> Self {
        Self {
            id: cell.pos.cell_id(),
            x: cell.pos.x,
            y: cell.pos.y,
            sequence: cell.sequence.clone(),
            is_loading: cell.is_loading,
        }
    }
}

impl TryFrom<PersistedCell> for Cell {
    type Error = HistoryError;

    fn try_from(p: PersistedCell) -> Result<Self, Self::Error> {
        let pos = GridPos::new(p.x, p.y);
        if p.id != pos.cell_id() {
            return Err(HistoryError::IdMismatch {
                id: p.id,
                x: p.x,
                y: p.y,
            });
        }
        Ok(Cell {
            pos,
            sequence: p.sequence,
            is_loading: p.is_loading,
            first_square: false,
        })
    }
}

/// An ordered copy of every cell on the grid at one point in time.
///
/// Sequences are deep-copied on capture, so later grid edits never reach
/// into history.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    cells: Vec<Cell>,
}

impl Snapshot {
    /// A snapshot with no cells.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture a deep copy of `cells`.
    pub fn capture(cells: &[Cell]) -> Self {
        Self {
            cells: cells.to_vec(),
        }
    }

    /// The captured cells in grid insertion order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Consume the snapshot, yielding its cells.
    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    /// Number of captured cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cells were captured.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Content fingerprint; see [`snapshot_fingerprint`].
    pub fn fingerprint(&self) -> u64 {
        snapshot_fingerprint(&self.cells)
    }

    /// The cells in persisted shape.
    pub fn to_persisted(&self) -> Vec<PersistedCell> {
        self.cells.iter().map(PersistedCell::from).collect()
    }

    /// Encode as a JSON array of persisted cells.
    pub fn to_json(&self) -> Result<String, HistoryError> {
        Ok(serde_json::to_string(&self.to_persisted())?)
    }

    /// Decode a JSON array of persisted cells.
    pub fn from_json(json: &str) -> Result<Self, HistoryError> {
        let persisted: Vec<PersistedCell> = serde_json::from_str(json)?;
        let cells = persisted
            .into_iter()
            .map(Cell::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { cells })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_core::Note;

    fn seq() -> Sequence {
        Sequence::quantized_from(vec![Note::quantized(67, 2, 6)], 4, 64)
    }

    #[test]
    fn persisted_shape_matches_wire_format() {
        let snap = Snapshot::capture(&[
            Cell::new(GridPos::new(5, 3), Some(seq())),
            Cell::placeholder(GridPos::new(6, 3)),
        ]);
        let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(value[0]["id"], "3-5");
        assert_eq!(value[0]["x"], 5);
        assert_eq!(value[0]["y"], 3);
        assert_eq!(value[0]["isLoading"], false);
        assert_eq!(value[0]["sequence"]["notes"][0]["pitch"], 67);
        assert_eq!(value[1]["sequence"], serde_json::Value::Null);
        assert_eq!(value[1]["isLoading"], true);
    }

    #[test]
    fn json_restores_cells_in_order() {
        let snap = Snapshot::capture(&[
            Cell::new(GridPos::new(1, 0), Some(seq())),
            Cell::new(GridPos::new(0, 0), None),
        ]);
        let back = Snapshot::from_json(&snap.to_json().unwrap()).unwrap();
        assert_eq!(back, snap);
        assert_eq!(back.fingerprint(), snap.fingerprint());
    }

    #[test]
    fn mismatched_id_is_rejected() {
        let json = r#"[{"id":"0-1","x":0,"y":1,"sequence":null,"isLoading":false}]"#;
        assert!(matches!(
            Snapshot::from_json(json),
            Err(HistoryError::IdMismatch { .. })
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(HistoryError::Json(_))
        ));
    }
}
