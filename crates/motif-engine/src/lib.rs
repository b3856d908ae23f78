//! Grid operations and the editing session for Motif.
//!
//! The three generative operations each split into a synchronous `begin`
//! that mutates the grid (placing loading placeholders where needed) and
//! a `complete` that consumes the sequence service's reply:
//!
//! - [`FirstSquareExpander`]: grows a single seed cell into a 2×2 block.
//! - [`PullOperator`]: pulls two neighbours apart and interpolates the gap.
//! - [`FormationFillEngine`]: fills the whole grid from a formation's corners.
//!
//! [`Session`] ties them to a [`GridStore`](motif_grid::GridStore), a
//! [`HistoryStore`](motif_history::HistoryStore) and a background
//! [`ServiceWorker`](motif_service::ServiceWorker), serializing edits with
//! a [`BatchLock`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod expand;
pub mod fill;
pub mod job;
pub mod lock;
pub mod metrics;
pub mod pull;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use error::EditError;
pub use expand::{ExpandJob, FirstSquareExpander, SampleJob};
pub use fill::{FillJob, FormationFillEngine};
pub use job::{Begin, EditOutcome, PendingJob};
pub use lock::{BatchGuard, BatchLock};
pub use metrics::SessionMetrics;
pub use pull::{PullJob, PullOperator};
pub use session::{Edit, EditKind, EditReport, EditTicket, Session};
