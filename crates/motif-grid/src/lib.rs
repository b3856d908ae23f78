//! The Motif grid: a bounded, sparse set of cells holding sequences.
//!
//! [`GridStore`] owns the cells and is the only place they are mutated.
//! [`FormationDetector`] derives the fully-occupied 2×2 blocks
//! ([`Formation`]s) from the store, recomputing only when the store's
//! revision has moved.
//!
//! # Change notification
//!
//! Every successful mutation returns a [`GridChange`] and broadcasts it to
//! all receivers obtained from [`GridStore::subscribe`]. Observers use this
//! to watch loading placeholders appear and resolve.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bounds;
pub mod cell;
pub mod error;
pub mod formation;
pub mod store;

pub use bounds::GridBounds;
pub use cell::Cell;
pub use error::GridError;
pub use formation::{detect_formations, Formation, FormationDetector};
pub use store::{GridChange, GridStore};
