//! Undo/redo history for the Motif grid.
//!
//! [`HistoryStore`] keeps a linear list of [`Snapshot`]s and a cursor.
//! Snapshots after the cursor form the redo branch; saving a new state
//! after an undo discards that branch.
//!
//! Snapshots serialize to the persisted cell shape
//! `{ id: "<y>-<x>", x, y, sequence, isLoading }` via [`PersistedCell`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod hash;
pub mod snapshot;
pub mod store;

pub use error::HistoryError;
pub use hash::snapshot_fingerprint;
pub use snapshot::{PersistedCell, Snapshot};
pub use store::HistoryStore;
