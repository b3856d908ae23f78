//! Motif: an editable grid of generated music sequences.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Motif sub-crates. Most users only need `motif` as a dependency.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use motif::prelude::*;
//!
//! // A service that echoes its input back.
//! struct Echo;
//! impl SequenceService for Echo {
//!     fn similar(&self, s: &Sequence, n: usize, _t: f64) -> Result<Vec<Sequence>, ServiceError> {
//!         Ok(vec![s.clone(); n])
//!     }
//!     fn interpolate(&self, e: &[Sequence; 2], n: usize) -> Result<Vec<Sequence>, ServiceError> {
//!         Ok(vec![e[0].clone(); n])
//!     }
//!     fn bilinear_interpolate(
//!         &self,
//!         c: &[Sequence; 4],
//!         dims: [u32; 2],
//!         _t: f64,
//!     ) -> Result<Vec<Sequence>, ServiceError> {
//!         Ok(vec![c[0].clone(); (dims[0] * dims[1]) as usize])
//!     }
//!     fn sample(&self, n: usize, _t: f64, _spq: u32, _qpm: f64) -> Result<Vec<Sequence>, ServiceError> {
//!         Ok(vec![Sequence::new(vec![Note::timed(60, 0.0, 0.5)]); n])
//!     }
//! }
//!
//! let mut session = Session::new(SessionConfig::default(), Arc::new(Echo)).unwrap();
//! let report = session.apply(Edit::SampleSeed).unwrap();
//! assert_eq!(report.result, Ok(EditOutcome::Applied));
//! assert_eq!(session.grid().len(), 4);
//! assert_eq!(session.formations().len(), 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `motif-core` | Positions, directions, sequences |
//! | [`grid`] | `motif-grid` | Cell store, bounds, formation detection |
//! | [`history`] | `motif-history` | Undo/redo snapshots and persistence |
//! | [`service`] | `motif-service` | Sequence service trait and worker thread |
//! | [`engine`] | `motif-engine` | Grid operations and the editing session |
//! | [`telemetry`] | | Tracing subscriber setup |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod telemetry;

/// Positions, directions, and note sequences (`motif-core`).
pub use motif_core as types;

/// Cell storage and formation detection (`motif-grid`).
///
/// [`grid::GridStore`] is the single source of truth for cell state;
/// [`grid::FormationDetector`] derives 2×2 formations from it.
pub use motif_grid as grid;

/// Undo/redo history (`motif-history`).
pub use motif_history as history;

/// The sequence service seam (`motif-service`).
///
/// Implement [`service::SequenceService`] to plug in a generative model.
pub use motif_service as service;

/// Grid operations and the editing session (`motif-engine`).
pub use motif_engine as engine;

/// Common imports for typical Motif usage.
///
/// ```rust
/// use motif::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use motif_core::{Direction, GridPos, Note, Sequence};

    // Grid
    pub use motif_grid::{Cell, Formation, GridBounds, GridChange, GridStore};

    // History
    pub use motif_history::Snapshot;

    // Service
    pub use motif_service::{SequenceService, ServiceError};

    // Engine
    pub use motif_engine::{
        ConfigError, Edit, EditError, EditOutcome, EditReport, Session, SessionConfig,
    };
}
