//! Core value types for the Motif sequence grid.
//!
//! This is the leaf crate of the workspace. It defines the vocabulary
//! shared by every other crate: grid positions and pull directions,
//! strongly-typed ids, and the [`Sequence`] payload placed on the grid.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod error;
pub mod id;
pub mod sequence;

pub use direction::{Axis, Direction};
pub use error::SequenceError;
pub use id::{GridGeneration, GridPos, RequestId};
pub use sequence::{Note, QuantizationInfo, Sequence, DEFAULT_QPM, STEPS_PER_QUARTER, TOTAL_STEPS};
