//! Jobs waiting on the sequence service.
//!
//! An operation's `begin` either finishes on the spot
//! ([`Begin::Done`]) or returns a job that knows which
//! [`ServiceRequest`] to send and how to apply the reply
//! ([`Begin::Pending`]). Every job remembers the grid generation it
//! was started against and discards replies that arrive after the
//! grid was cleared or restored.

use motif_core::{GridGeneration, Sequence};
use motif_grid::GridStore;
use motif_service::{SequenceService, ServiceError, ServiceRequest};

use crate::error::EditError;
use crate::expand::{ExpandJob, FirstSquareExpander, SampleJob};
use crate::fill::FillJob;
use crate::pull::PullJob;

/// How a finished edit affected the grid.
#[derive(Clone, Debug, PartialEq)]
pub enum EditOutcome {
    /// The grid was changed as requested.
    Applied,
    /// Preconditions did not hold; nothing changed.
    NoOp {
        /// Why the edit did nothing.
        reason: &'static str,
    },
    /// The service reply arrived after the grid was replaced and was
    /// dropped.
    Discarded,
    /// The grid was changed, but a service problem forced a fallback.
    Degraded {
        /// What went wrong.
        reason: String,
    },
}

impl EditOutcome {
    /// Whether the edit may have changed the grid.
    pub fn changed_grid(&self) -> bool {
        matches!(self, Self::Applied | Self::Degraded { .. })
    }
}

/// Result of an operation's synchronous phase.
#[derive(Debug)]
pub enum Begin<J> {
    /// The operation finished without needing the service.
    Done(EditOutcome),
    /// The operation waits on a service reply.
    Pending(J),
}

/// Result of feeding a service reply to a [`PendingJob`].
#[derive(Debug)]
pub enum JobStep {
    /// The edit is over.
    Finished(Result<EditOutcome, EditError>),
    /// The edit needs another service round trip.
    Continue(PendingJob),
}

/// Any job that can be waiting on the service worker.
#[derive(Debug)]
pub enum PendingJob {
    /// Variants for a first-square expansion.
    Expand(ExpandJob),
    /// Interpolation frames for a pull gap.
    Pull(PullJob),
    /// Bilinear grid for a formation fill.
    Fill(FillJob),
    /// A sampled seed for a first-square expansion.
    Sample(SampleJob),
}

impl PendingJob {
    /// The request to hand to the worker.
    pub fn request(&self) -> ServiceRequest {
        match self {
            Self::Expand(j) => j.request(),
            Self::Pull(j) => j.request(),
            Self::Fill(j) => j.request(),
            Self::Sample(j) => j.request(),
        }
    }

    /// The grid generation the job was started against.
    pub fn generation(&self) -> GridGeneration {
        match self {
            Self::Expand(j) => j.generation(),
            Self::Pull(j) => j.generation(),
            Self::Fill(j) => j.generation(),
            Self::Sample(j) => j.generation(),
        }
    }

    /// Apply `reply` to `grid`.
    ///
    /// A sampled seed continues into a first-square expansion through
    /// `expander`, which may need `service` for quantization.
    pub fn complete(
        self,
        grid: &mut GridStore,
        service: &dyn SequenceService,
        expander: &FirstSquareExpander,
        reply: Result<Vec<Sequence>, ServiceError>,
    ) -> JobStep {
        match self {
            Self::Expand(j) => JobStep::Finished(Ok(j.complete(grid, reply))),
            Self::Pull(j) => JobStep::Finished(Ok(j.complete(grid, reply))),
            Self::Fill(j) => JobStep::Finished(j.complete(grid, reply)),
            Self::Sample(j) => match j.complete(grid, reply) {
                Ok(Some(seed)) => match expander.begin(grid, service, seed) {
                    Begin::Done(outcome) => JobStep::Finished(Ok(outcome)),
                    Begin::Pending(next) => JobStep::Continue(Self::Expand(next)),
                },
                Ok(None) => JobStep::Finished(Ok(EditOutcome::Discarded)),
                Err(e) => JobStep::Finished(Err(e)),
            },
        }
    }
}

/// Whether `grid` moved past `generation` since a job began.
pub(crate) fn is_stale(grid: &GridStore, generation: GridGeneration, kind: &str) -> bool {
    let stale = grid.generation() != generation;
    if stale {
        tracing::debug!(
            kind,
            started = %generation,
            current = %grid.generation(),
            "discarding reply for replaced grid"
        );
    }
    stale
}
