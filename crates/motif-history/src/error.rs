//! Error types for snapshot persistence.

use std::error::Error;
use std::fmt;

/// Errors from converting snapshots to and from their persisted form.
#[derive(Debug)]
pub enum HistoryError {
    /// JSON encoding or decoding failed.
    Json(serde_json::Error),
    /// A persisted cell's `id` does not match its coordinates.
    IdMismatch {
        /// The stored id.
        id: String,
        /// The stored column.
        x: i32,
        /// The stored row.
        y: i32,
    },
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "snapshot json: {e}"),
            Self::IdMismatch { id, x, y } => {
                write!(f, "cell id {id:?} does not match position ({x}, {y})")
            }
        }
    }
}

impl Error for HistoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::IdMismatch { .. } => None,
        }
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
