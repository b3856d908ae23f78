//! User-facing `Session` API.
//!
//! A session owns the grid, its formation cache, the undo history and a
//! background [`ServiceWorker`]. Edits are submitted one at a time:
//!
//! ```text
//! Caller                        Session                      motif-service thread
//!   |--submit(edit)---------------->| lock.try_acquire()          |
//!   |                               | op.begin(grid)              |
//!   |                               |   (placeholders appear)     |
//!   |                               |--worker.submit(request)---->| service call
//!   |<--Ok(ticket)------------------|                             |
//!   |--poll() / wait()------------->|<--ServiceReply{id}----------|
//!   |                               | job.complete(grid, reply)   |
//!   |                               | history.save_state()        |
//!   |<--EditReport------------------| guard dropped               |
//! ```
//!
//! While an edit is in flight every other grid-mutating call fails with
//! [`EditError::Busy`]. [`Session::reset`] is the exception: it drops the
//! pending job and replaces the grid, so the late reply is discarded.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use motif_core::{Direction, GridPos, RequestId, Sequence};
use motif_grid::{Formation, FormationDetector, GridChange, GridStore};
use motif_history::{HistoryStore, Snapshot};
use motif_service::{ReplyError, SequenceService, ServiceError, ServiceReply, ServiceWorker, SubmitError};

use crate::config::{ConfigError, SessionConfig};
use crate::error::EditError;
use crate::expand::FirstSquareExpander;
use crate::fill::FormationFillEngine;
use crate::job::{Begin, EditOutcome, JobStep, PendingJob};
use crate::lock::{BatchGuard, BatchLock};
use crate::metrics::SessionMetrics;
use crate::pull::PullOperator;

// ── Edit types ───────────────────────────────────────────────────

/// One logical user action on the grid.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    /// Insert or replace a settled cell.
    Place {
        /// Target position.
        pos: GridPos,
        /// Sequence for the cell, if any.
        sequence: Option<Sequence>,
    },
    /// Delete cells.
    Remove {
        /// Positions to clear.
        positions: Vec<GridPos>,
    },
    /// Delete every cell.
    Clear,
    /// Give the lone seed cell a sequence and grow it into a 2×2 block.
    ExpandFirstSquare {
        /// The seed's new sequence.
        sequence: Sequence,
    },
    /// Pull a cell away from, or apart from, its neighbour.
    Pull {
        /// The cell being pulled.
        origin: GridPos,
        /// Direction of the pull gesture.
        direction: Direction,
        /// The origin's sequence as seen by the caller.
        sequence: Option<Sequence>,
        /// Cells each end moves; `None` uses the configured strength.
        strength: Option<u32>,
    },
    /// Fill the whole grid from the formation whose top-left is `origin`.
    FillFormation {
        /// Top-left corner of the formation.
        origin: GridPos,
    },
    /// Sample a seed sequence and expand the lone cell with it.
    SampleSeed,
}

impl Edit {
    /// The kind of edit.
    pub fn kind(&self) -> EditKind {
        match self {
            Self::Place { .. } => EditKind::Place,
            Self::Remove { .. } => EditKind::Remove,
            Self::Clear => EditKind::Clear,
            Self::ExpandFirstSquare { .. } => EditKind::ExpandFirstSquare,
            Self::Pull { .. } => EditKind::Pull,
            Self::FillFormation { .. } => EditKind::FillFormation,
            Self::SampleSeed => EditKind::SampleSeed,
        }
    }
}

/// Discriminant of [`Edit`], carried in reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// [`Edit::Place`].
    Place,
    /// [`Edit::Remove`].
    Remove,
    /// [`Edit::Clear`].
    Clear,
    /// [`Edit::ExpandFirstSquare`].
    ExpandFirstSquare,
    /// [`Edit::Pull`].
    Pull,
    /// [`Edit::FillFormation`].
    FillFormation,
    /// [`Edit::SampleSeed`].
    SampleSeed,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Place => "place",
            Self::Remove => "remove",
            Self::Clear => "clear",
            Self::ExpandFirstSquare => "expand-first-square",
            Self::Pull => "pull",
            Self::FillFormation => "fill-formation",
            Self::SampleSeed => "sample-seed",
        };
        f.write_str(name)
    }
}

/// Identifies one submitted edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditTicket(pub u64);

impl fmt::Display for EditTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a submitted edit ended.
#[derive(Clone, Debug, PartialEq)]
pub struct EditReport {
    /// The ticket returned by [`Session::submit`].
    pub ticket: EditTicket,
    /// What kind of edit it was.
    pub kind: EditKind,
    /// The outcome, or why the edit failed after it was accepted.
    pub result: Result<EditOutcome, EditError>,
    /// Whether a history snapshot was saved for this edit.
    pub snapshot_saved: bool,
    /// Time from submission to completion.
    pub elapsed: Duration,
}

// ── Session ──────────────────────────────────────────────────────

struct InFlight {
    ticket: EditTicket,
    kind: EditKind,
    request: RequestId,
    job: PendingJob,
    started: Instant,
    _guard: BatchGuard,
}

/// An editing session over one grid.
pub struct Session {
    config: SessionConfig,
    grid: GridStore,
    detector: FormationDetector,
    history: HistoryStore,
    service: Arc<dyn SequenceService>,
    worker: ServiceWorker,
    lock: BatchLock,
    expander: FirstSquareExpander,
    puller: PullOperator,
    filler: FormationFillEngine,
    pending: Option<InFlight>,
    finished: VecDeque<EditReport>,
    next_ticket: u64,
    metrics: SessionMetrics,
}

impl Session {
    /// Validate `config`, spawn the service worker and start from a grid
    /// holding one blank cell at its center.
    pub fn new(config: SessionConfig, service: Arc<dyn SequenceService>) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = config.bounds()?;
        let worker = ServiceWorker::spawn(Arc::clone(&service), config.worker_queue_capacity)
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("motif-service: {e}"),
            })?;

        let mut grid = GridStore::new(bounds);
        grid.initialize_grid();
        let mut history = HistoryStore::with_max_depth(config.history_depth);
        history.initialize_history(&grid.snapshot_cells());

        tracing::info!(cols = bounds.cols(), rows = bounds.rows(), "session started");
        Ok(Self {
            expander: FirstSquareExpander::from_config(&config),
            puller: PullOperator::from_config(&config),
            filler: FormationFillEngine::from_config(&config),
            config,
            grid,
            detector: FormationDetector::new(),
            history,
            service,
            worker,
            lock: BatchLock::new(),
            pending: None,
            finished: VecDeque::new(),
            next_ticket: 0,
            metrics: SessionMetrics::default(),
        })
    }

    // ── Accessors ────────────────────────────────────────────────

    /// The configuration the session was built with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Read-only view of the grid.
    pub fn grid(&self) -> &GridStore {
        &self.grid
    }

    /// Current formations, rescanned only when the grid changed.
    pub fn formations(&mut self) -> &[Formation] {
        self.detector.formations(&self.grid)
    }

    /// The undo history.
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// A handle on the batch lock, for observing whether an edit is in
    /// flight.
    pub fn batch_lock(&self) -> BatchLock {
        self.lock.clone()
    }

    /// Whether an edit is waiting on the service.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Receive every future grid change.
    pub fn subscribe(&mut self) -> Receiver<GridChange> {
        self.grid.subscribe()
    }

    /// Cumulative statistics.
    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    // ── Editing ──────────────────────────────────────────────────

    /// Start `edit`.
    ///
    /// Edits that need no generated sequences finish immediately; their
    /// report is returned by the next [`poll`](Self::poll) or
    /// [`wait`](Self::wait). Fails with [`EditError::Busy`] while another
    /// edit is in flight, and with
    /// [`EditError::IncompleteFormation`] before touching the grid.
    pub fn submit(&mut self, edit: Edit) -> Result<EditTicket, EditError> {
        let Some(guard) = self.lock.try_acquire() else {
            self.metrics.busy_rejections += 1;
            tracing::debug!(kind = %edit.kind(), "edit rejected: busy");
            return Err(EditError::Busy);
        };
        let ticket = EditTicket(self.next_ticket);
        let kind = edit.kind();
        let started = Instant::now();
        let begin = match self.begin(edit) {
            Ok(begin) => begin,
            Err(err) => {
                self.metrics.edits_failed += 1;
                tracing::warn!(%kind, "edit rejected: {err}");
                return Err(err);
            }
        };
        self.next_ticket += 1;
        self.metrics.edits_submitted += 1;
        tracing::debug!(%ticket, %kind, "edit started");

        match begin {
            Begin::Done(outcome) => self.finish(ticket, kind, started, Ok(outcome)),
            Begin::Pending(job) => self.dispatch(ticket, kind, started, job, guard),
        }
        Ok(ticket)
    }

    /// Run `edit` to completion, blocking on the service if needed.
    pub fn apply(&mut self, edit: Edit) -> Result<EditReport, EditError> {
        let ticket = self.submit(edit)?;
        loop {
            if let Some(i) = self.finished.iter().position(|r| r.ticket == ticket) {
                if let Some(report) = self.finished.remove(i) {
                    return Ok(report);
                }
            }
            self.receive_blocking()?;
        }
    }

    /// Process replies that have already arrived and return every
    /// report finished since the last call.
    pub fn poll(&mut self) -> Vec<EditReport> {
        while self.pending.is_some() {
            match self.worker.try_recv() {
                Ok(Some(reply)) => self.on_reply(reply),
                Ok(None) => break,
                Err(_) => self.fail_pending(EditError::Shutdown),
            }
        }
        self.drain_stale();
        self.finished.drain(..).collect()
    }

    /// The next finished report, blocking on the service when an edit is
    /// in flight. Returns `None` when nothing is pending or the
    /// configured reply timeout elapsed.
    pub fn wait(&mut self) -> Option<EditReport> {
        loop {
            if let Some(report) = self.finished.pop_front() {
                return Some(report);
            }
            if self.pending.is_none() {
                return None;
            }
            if self.receive_blocking().is_err() {
                return None;
            }
        }
    }

    /// Step back one history snapshot and restore it into the grid.
    ///
    /// Returns `Ok(false)` at the oldest snapshot.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        let _guard = self.lock.try_acquire().ok_or(EditError::Busy)?;
        let Some(snapshot) = self.history.undo().cloned() else {
            return Ok(false);
        };
        self.grid.restore(snapshot.into_cells());
        tracing::debug!(cursor = self.history.cursor(), "undo");
        Ok(true)
    }

    /// Step forward one history snapshot and restore it into the grid.
    ///
    /// Returns `Ok(false)` at the newest snapshot.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        let _guard = self.lock.try_acquire().ok_or(EditError::Busy)?;
        let Some(snapshot) = self.history.redo().cloned() else {
            return Ok(false);
        };
        self.grid.restore(snapshot.into_cells());
        tracing::debug!(cursor = self.history.cursor(), "redo");
        Ok(true)
    }

    /// Drop any pending edit, return the grid to its start state and
    /// restart the history from it.
    ///
    /// A reply to the dropped edit is discarded when it arrives.
    pub fn reset(&mut self) {
        if let Some(dropped) = self.pending.take() {
            tracing::info!(ticket = %dropped.ticket, kind = %dropped.kind, "dropping pending edit on reset");
        }
        self.finished.clear();
        self.grid.initialize_grid();
        self.history.initialize_history(&self.grid.snapshot_cells());
        tracing::info!("session reset");
    }

    /// Snapshot of the current grid.
    pub fn export_snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.grid.snapshot_cells())
    }

    /// Replace the grid with `snapshot` and record it as a new history
    /// state.
    pub fn import_snapshot(&mut self, snapshot: Snapshot) -> Result<(), EditError> {
        let _guard = self.lock.try_acquire().ok_or(EditError::Busy)?;
        self.grid.restore(snapshot.into_cells());
        self.history.save_state(&self.grid.snapshot_cells());
        Ok(())
    }

    /// Stop the service worker. Pending and future generative edits fail
    /// with [`EditError::Shutdown`].
    pub fn shutdown(&mut self) -> bool {
        let joined = self.worker.shutdown();
        if self.pending.is_some() {
            self.fail_pending(EditError::Shutdown);
        }
        tracing::info!(joined, "session shut down");
        joined
    }

    // ── Internals ────────────────────────────────────────────────

    fn begin(&mut self, edit: Edit) -> Result<Begin<PendingJob>, EditError> {
        let service = &*self.service;
        let grid = &mut self.grid;
        let begin = match edit {
            Edit::Place { pos, sequence } => match grid.place_square(pos, sequence, false) {
                Ok(_) => Begin::Done(EditOutcome::Applied),
                Err(_) => Begin::Done(EditOutcome::NoOp {
                    reason: "position out of bounds",
                }),
            },
            Edit::Remove { positions } => match grid.remove_squares(&positions) {
                Some(_) => Begin::Done(EditOutcome::Applied),
                None => Begin::Done(EditOutcome::NoOp {
                    reason: "no cell at the given positions",
                }),
            },
            Edit::Clear => {
                grid.clear_grid();
                Begin::Done(EditOutcome::Applied)
            }
            Edit::ExpandFirstSquare { sequence } => {
                wrap(self.expander.begin(grid, service, sequence), PendingJob::Expand)
            }
            Edit::Pull {
                origin,
                direction,
                sequence,
                strength,
            } => wrap(
                self.puller
                    .begin(grid, service, origin, direction, sequence, strength),
                PendingJob::Pull,
            ),
            Edit::FillFormation { origin } => {
                wrap(self.filler.begin(grid, service, origin)?, PendingJob::Fill)
            }
            Edit::SampleSeed => wrap(self.expander.begin_sample(grid), PendingJob::Sample),
        };
        Ok(begin)
    }

    fn dispatch(&mut self, ticket: EditTicket, kind: EditKind, started: Instant, job: PendingJob, guard: BatchGuard) {
        match self.worker.submit(job.request()) {
            Ok(request) => {
                self.metrics.service_requests += 1;
                self.pending = Some(InFlight {
                    ticket,
                    kind,
                    request,
                    job,
                    started,
                    _guard: guard,
                });
            }
            Err(err) => {
                tracing::warn!(%ticket, "could not reach service worker: {err}");
                let reason = match err {
                    SubmitError::Shutdown => "worker has shut down",
                    SubmitError::ChannelFull => "worker queue is full",
                };
                let reply = Err(ServiceError::Unavailable {
                    reason: reason.to_string(),
                });
                let step = job.complete(&mut self.grid, &*self.service, &self.expander, reply);
                drop(guard);
                let result = match step {
                    JobStep::Finished(result) => result,
                    JobStep::Continue(_) => Err(EditError::Shutdown),
                };
                self.finish(ticket, kind, started, result);
            }
        }
    }

    fn receive_blocking(&mut self) -> Result<(), EditError> {
        match self.worker.recv(self.config.reply_timeout) {
            Ok(reply) => {
                self.on_reply(reply);
                Ok(())
            }
            Err(ReplyError::Timeout) => Err(EditError::Timeout),
            Err(ReplyError::Shutdown) => {
                self.fail_pending(EditError::Shutdown);
                Err(EditError::Shutdown)
            }
        }
    }

    fn on_reply(&mut self, reply: ServiceReply) {
        self.metrics.last_service_us = reply.elapsed.as_micros() as u64;
        let Some(in_flight) = self.pending.take_if(|p| p.request == reply.id) else {
            self.metrics.stale_replies += 1;
            tracing::debug!(id = %reply.id, "dropping reply with no pending edit");
            return;
        };
        let InFlight {
            ticket,
            kind,
            job,
            started,
            _guard: guard,
            ..
        } = in_flight;
        match job.complete(&mut self.grid, &*self.service, &self.expander, reply.result) {
            JobStep::Finished(result) => {
                drop(guard);
                self.finish(ticket, kind, started, result);
            }
            JobStep::Continue(next) => self.dispatch(ticket, kind, started, next, guard),
        }
    }

    fn fail_pending(&mut self, error: EditError) {
        if let Some(in_flight) = self.pending.take() {
            let InFlight {
                ticket,
                kind,
                started,
                _guard: guard,
                ..
            } = in_flight;
            drop(guard);
            self.finish(ticket, kind, started, Err(error));
        }
    }

    /// Consume replies left over from edits dropped by `reset`.
    fn drain_stale(&mut self) {
        if self.pending.is_some() {
            return;
        }
        while let Ok(Some(reply)) = self.worker.try_recv() {
            self.on_reply(reply);
        }
    }

    fn finish(&mut self, ticket: EditTicket, kind: EditKind, started: Instant, result: Result<EditOutcome, EditError>) {
        match &result {
            Ok(EditOutcome::Applied) => self.metrics.edits_applied += 1,
            Ok(EditOutcome::Degraded { reason }) => {
                self.metrics.edits_degraded += 1;
                tracing::warn!(%ticket, %kind, "edit degraded: {reason}");
            }
            Ok(EditOutcome::NoOp { .. }) | Ok(EditOutcome::Discarded) => self.metrics.edits_noop += 1,
            Err(err) => {
                self.metrics.edits_failed += 1;
                tracing::warn!(%ticket, %kind, "edit failed: {err}");
            }
        }
        let changed = matches!(&result, Ok(outcome) if outcome.changed_grid());
        let snapshot_saved = changed && self.config.auto_snapshot && self.save_if_changed();
        let elapsed = started.elapsed();
        tracing::debug!(%ticket, %kind, ?elapsed, snapshot_saved, "edit finished");
        self.finished.push_back(EditReport {
            ticket,
            kind,
            result,
            snapshot_saved,
            elapsed,
        });
    }

    fn save_if_changed(&mut self) -> bool {
        let cells = self.grid.snapshot_cells();
        if self.history.current().cells() == cells.as_slice() {
            return false;
        }
        self.history.save_state(&cells);
        self.metrics.snapshots_saved += 1;
        true
    }
}

fn wrap<J>(begin: Begin<J>, f: impl FnOnce(J) -> PendingJob) -> Begin<PendingJob> {
    match begin {
        Begin::Done(outcome) => Begin::Done(outcome),
        Begin::Pending(job) => Begin::Pending(f(job)),
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("grid", &self.grid)
            .field("history_len", &self.history.len())
            .field("busy", &self.pending.is_some())
            .field("worker", &self.worker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_test_utils::fixtures::{first_pitch, melody};
    use motif_test_utils::{MockMethod, MockSequenceService};

    fn session() -> (Session, Arc<MockSequenceService>) {
        let mock = Arc::new(MockSequenceService::new());
        let config = SessionConfig {
            reply_timeout: Some(Duration::from_secs(5)),
            ..SessionConfig::default()
        };
        (Session::new(config, mock.clone()).unwrap(), mock)
    }

    #[test]
    fn starts_with_center_seed_and_matching_history() {
        let (s, _) = session();
        assert_eq!(s.grid().sole_cell().unwrap().pos, GridPos::new(5, 3));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().current().len(), 1);
        assert!(!s.batch_lock().is_held());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            cols: 0,
            ..SessionConfig::default()
        };
        let err = Session::new(config, Arc::new(MockSequenceService::new())).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDimension { .. }));
    }

    #[test]
    fn synchronous_edit_reports_on_poll_and_snapshots_once() {
        let (mut s, _) = session();
        let t = s
            .submit(Edit::Place {
                pos: GridPos::new(0, 0),
                sequence: Some(melody(&[60])),
            })
            .unwrap();
        assert!(!s.batch_lock().is_held());
        let reports = s.poll();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].ticket, t);
        assert_eq!(reports[0].result, Ok(EditOutcome::Applied));
        assert!(reports[0].snapshot_saved);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn noop_edit_takes_no_snapshot() {
        let (mut s, _) = session();
        let r = s
            .apply(Edit::Remove {
                positions: vec![GridPos::new(0, 0)],
            })
            .unwrap();
        assert!(matches!(r.result, Ok(EditOutcome::NoOp { .. })));
        assert!(!r.snapshot_saved);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn expand_round_trip_through_worker() {
        let (mut s, mock) = session();
        let r = s
            .apply(Edit::ExpandFirstSquare {
                sequence: melody(&[60, 62]),
            })
            .unwrap();
        assert_eq!(r.kind, EditKind::ExpandFirstSquare);
        assert_eq!(r.result, Ok(EditOutcome::Applied));
        assert_eq!(s.grid().len(), 4);
        assert_eq!(s.formations().len(), 1);
        assert_eq!(mock.calls_to(MockMethod::Similar).len(), 1);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.metrics().service_requests, 1);
    }

    #[test]
    fn sample_seed_chains_into_expansion() {
        let (mut s, mock) = session();
        let r = s.apply(Edit::SampleSeed).unwrap();
        assert_eq!(r.result, Ok(EditOutcome::Applied));
        assert_eq!(s.grid().len(), 4);
        let seed = s.grid().get_square_at_position(GridPos::new(5, 3)).unwrap();
        assert_eq!(seed.sequence.as_ref().and_then(first_pitch), Some(48));
        assert_eq!(mock.calls_to(MockMethod::Sample).len(), 1);
        assert_eq!(mock.calls_to(MockMethod::Similar).len(), 1);
        assert_eq!(s.metrics().service_requests, 2);
        // One logical action, one snapshot.
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn identical_replacement_takes_no_snapshot() {
        let (mut s, _) = session();
        let place = |pitch| Edit::Place {
            pos: GridPos::new(0, 0),
            sequence: Some(melody(&[pitch])),
        };
        assert!(s.apply(place(60)).unwrap().snapshot_saved);
        let again = s.apply(place(60)).unwrap();
        assert_eq!(again.result, Ok(EditOutcome::Applied));
        assert!(!again.snapshot_saved);
        assert!(s.apply(place(61)).unwrap().snapshot_saved);
        assert_eq!(s.history().len(), 3);
        assert_eq!(s.metrics().snapshots_saved, 2);
        assert_eq!(s.history().current().cells(), s.grid().snapshot_cells().as_slice());
    }

    #[test]
    fn undo_and_redo_restore_grid() {
        let (mut s, _) = session();
        s.apply(Edit::Place {
            pos: GridPos::new(0, 0),
            sequence: None,
        })
        .unwrap();
        assert_eq!(s.grid().len(), 2);
        assert!(s.undo().unwrap());
        assert_eq!(s.grid().len(), 1);
        assert!(!s.undo().unwrap());
        assert!(s.redo().unwrap());
        assert_eq!(s.grid().len(), 2);
        assert!(!s.redo().unwrap());
    }

    #[test]
    fn incomplete_formation_is_rejected_up_front() {
        let (mut s, _) = session();
        s.apply(Edit::Place {
            pos: GridPos::new(4, 3),
            sequence: Some(melody(&[60])),
        })
        .unwrap();
        s.apply(Edit::Place {
            pos: GridPos::new(4, 4),
            sequence: Some(melody(&[60])),
        })
        .unwrap();
        s.apply(Edit::Place {
            pos: GridPos::new(5, 4),
            sequence: Some(melody(&[60])),
        })
        .unwrap();
        let before = s.grid().snapshot_cells();
        let err = s
            .submit(Edit::FillFormation {
                origin: GridPos::new(4, 3),
            })
            .unwrap_err();
        assert!(matches!(err, EditError::IncompleteFormation { .. }));
        assert!(!s.batch_lock().is_held());
        assert_eq!(s.metrics().edits_failed, 1);
        assert_eq!(s.metrics().edits_submitted, 3);
        assert_eq!(s.grid().snapshot_cells(), before);
    }

    #[test]
    fn export_import_round_trip() {
        let (mut s, _) = session();
        s.apply(Edit::Place {
            pos: GridPos::new(1, 1),
            sequence: Some(melody(&[64])),
        })
        .unwrap();
        let json = s.export_snapshot().to_json().unwrap();
        s.reset();
        assert_eq!(s.grid().len(), 1);
        s.import_snapshot(Snapshot::from_json(&json).unwrap()).unwrap();
        assert_eq!(s.grid().len(), 2);
        assert!(s.history().can_undo());
    }

    #[test]
    fn shutdown_fails_later_generative_edits() {
        let (mut s, _) = session();
        assert!(s.shutdown());
        let r = s
            .apply(Edit::ExpandFirstSquare {
                sequence: melody(&[60]),
            })
            .unwrap();
        // The seed was written and fallback copies were placed.
        assert!(matches!(r.result, Ok(EditOutcome::Degraded { .. })));
        assert_eq!(s.grid().len(), 4);
        assert!(!s.batch_lock().is_held());
    }
}
