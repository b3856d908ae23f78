//! End-to-end editing flows through `Session` and its service worker.

use std::sync::Arc;
use std::time::Duration;

use motif_core::{Direction, GridPos};
use motif_engine::{Edit, EditError, EditKind, EditOutcome, Session, SessionConfig};
use motif_grid::GridChange;
use motif_test_utils::fixtures::{first_pitch, melody};
use motif_test_utils::{MockMethod, MockSequenceService};

fn config() -> SessionConfig {
    SessionConfig {
        reply_timeout: Some(Duration::from_secs(5)),
        ..SessionConfig::default()
    }
}

fn session() -> (Session, Arc<MockSequenceService>) {
    let mock = Arc::new(MockSequenceService::new());
    (Session::new(config(), mock.clone()).unwrap(), mock)
}

fn pitch_at(s: &Session, x: i32, y: i32) -> Option<u8> {
    s.grid()
        .get_square_at_position(GridPos::new(x, y))
        .and_then(|c| c.sequence.as_ref())
        .and_then(first_pitch)
}

fn place(s: &mut Session, x: i32, y: i32, pitch: u8) {
    let r = s
        .apply(Edit::Place {
            pos: GridPos::new(x, y),
            sequence: Some(melody(&[pitch])),
        })
        .unwrap();
    assert_eq!(r.result, Ok(EditOutcome::Applied));
}

// ── Expansion ────────────────────────────────────────────────────

#[test]
fn seed_expands_into_one_formation() {
    let (mut s, _) = session();
    s.apply(Edit::ExpandFirstSquare {
        sequence: melody(&[60, 62]),
    })
    .unwrap();

    assert_eq!(s.grid().len(), 4);
    assert_eq!(pitch_at(&s, 5, 3), Some(60));
    assert_eq!(pitch_at(&s, 4, 3), Some(61));
    assert_eq!(pitch_at(&s, 4, 4), Some(62));
    assert_eq!(pitch_at(&s, 5, 4), Some(63));

    let formations = s.formations().to_vec();
    assert_eq!(formations.len(), 1);
    assert_eq!(formations[0].origin, GridPos::new(4, 3));
    assert_eq!(formations[0].anchor(), (4.5, 3.5));
}

#[test]
fn expansion_needs_a_lone_seed() {
    let (mut s, mock) = session();
    place(&mut s, 0, 0, 50);
    let r = s
        .apply(Edit::ExpandFirstSquare {
            sequence: melody(&[60]),
        })
        .unwrap();
    assert!(matches!(r.result, Ok(EditOutcome::NoOp { .. })));
    assert!(mock.calls_to(MockMethod::Similar).is_empty());
}

// ── Batch lock ───────────────────────────────────────────────────

#[test]
fn second_edit_is_busy_while_first_is_in_flight() {
    let (mock, gate) = MockSequenceService::gated();
    let mut s = Session::new(config(), Arc::new(mock)).unwrap();

    let ticket = s
        .submit(Edit::ExpandFirstSquare {
            sequence: melody(&[60]),
        })
        .unwrap();
    assert!(s.batch_lock().is_held());
    assert!(s.is_busy());

    let err = s.submit(Edit::Clear).unwrap_err();
    assert_eq!(err, EditError::Busy);
    assert_eq!(s.undo(), Err(EditError::Busy));
    assert_eq!(s.metrics().busy_rejections, 1);

    gate.release();
    let report = s.wait().unwrap();
    assert_eq!(report.ticket, ticket);
    assert_eq!(report.result, Ok(EditOutcome::Applied));
    assert!(!s.batch_lock().is_held());

    let r = s.apply(Edit::Clear).unwrap();
    assert_eq!(r.kind, EditKind::Clear);
    assert!(s.grid().is_empty());
}

#[test]
fn wait_with_nothing_pending_returns_none() {
    let (mut s, _) = session();
    assert!(s.wait().is_none());
}

// ── Stale replies ────────────────────────────────────────────────

#[test]
fn reply_after_reset_is_discarded() {
    let (mock, gate) = MockSequenceService::gated();
    let mut s = Session::new(config(), Arc::new(mock)).unwrap();

    s.submit(Edit::ExpandFirstSquare {
        sequence: melody(&[60]),
    })
    .unwrap();
    s.reset();
    assert!(!s.batch_lock().is_held());
    assert_eq!(s.grid().len(), 1);
    assert_eq!(s.history().len(), 1);

    // Let both the dropped call and the next one through.
    gate.release();
    gate.release();
    let r = s
        .apply(Edit::ExpandFirstSquare {
            sequence: melody(&[70]),
        })
        .unwrap();
    assert_eq!(r.result, Ok(EditOutcome::Applied));
    assert_eq!(s.metrics().stale_replies, 1);
    assert_eq!(pitch_at(&s, 5, 3), Some(70));
    assert_eq!(pitch_at(&s, 4, 3), Some(71));
}

#[test]
fn shutdown_finishes_with_queued_stale_work() {
    let (mock, gate) = MockSequenceService::gated();
    let cfg = SessionConfig {
        worker_queue_capacity: 1,
        ..config()
    };
    let mut s = Session::new(cfg, Arc::new(mock)).unwrap();
    s.submit(Edit::ExpandFirstSquare {
        sequence: melody(&[60]),
    })
    .unwrap();
    s.reset();
    s.submit(Edit::ExpandFirstSquare {
        sequence: melody(&[62]),
    })
    .unwrap();
    drop(gate);

    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let joined = s.shutdown();
        let _ = done_tx.send((joined, s.is_busy()));
    });
    assert_eq!(done_rx.recv_timeout(Duration::from_secs(5)), Ok((true, false)));
}

// ── Pull ─────────────────────────────────────────────────────────

#[test]
fn pull_shows_placeholders_then_fills_frames_in_order() {
    let (mock, gate) = MockSequenceService::gated();
    let mut s = Session::new(config(), Arc::new(mock)).unwrap();
    place(&mut s, 5, 3, 70);
    place(&mut s, 4, 3, 72);
    let changes = s.subscribe();

    s.submit(Edit::Pull {
        origin: GridPos::new(5, 3),
        direction: Direction::Left,
        sequence: Some(melody(&[70])),
        strength: None,
    })
    .unwrap();

    // Origin moved right by 3, neighbour left by 3; the gap is loading.
    assert_eq!(pitch_at(&s, 8, 3), Some(70));
    assert_eq!(pitch_at(&s, 1, 3), Some(72));
    for x in 2..=7 {
        let cell = s.grid().get_square_at_position(GridPos::new(x, 3)).unwrap();
        assert!(cell.is_loading, "x = {x}");
        assert!(cell.sequence.is_none());
    }
    assert!(s.grid().has_pending());
    let loading_events = changes
        .try_iter()
        .filter(|c| matches!(c, GridChange::Placed { is_loading: true, .. }))
        .count();
    assert_eq!(loading_events, 6);

    gate.release();
    let r = s.wait().unwrap();
    assert_eq!(r.result, Ok(EditOutcome::Applied));
    assert!(!s.grid().has_pending());
    for (i, x) in (2..=7).enumerate() {
        assert_eq!(pitch_at(&s, x, 3), Some(61 + i as u8));
    }
}

#[test]
fn pull_failure_leaves_placeholders_and_clears_lock() {
    let (mut s, mock) = session();
    place(&mut s, 5, 3, 70);
    place(&mut s, 5, 2, 72);
    mock.fail(MockMethod::Interpolate);

    let r = s
        .apply(Edit::Pull {
            origin: GridPos::new(5, 3),
            direction: Direction::Up,
            sequence: Some(melody(&[70])),
            strength: Some(1),
        })
        .unwrap();
    assert!(matches!(r.result, Ok(EditOutcome::Degraded { .. })));
    assert!(!s.batch_lock().is_held());
    assert_eq!(pitch_at(&s, 5, 4), Some(70));
    assert_eq!(pitch_at(&s, 5, 1), Some(72));
    assert!(s.grid().has_pending());
}

#[test]
fn lone_cell_slides_without_service() {
    let (mut s, mock) = session();
    place(&mut s, 5, 3, 70);
    let r = s
        .apply(Edit::Pull {
            origin: GridPos::new(5, 3),
            direction: Direction::Right,
            sequence: Some(melody(&[70])),
            strength: None,
        })
        .unwrap();
    assert_eq!(r.result, Ok(EditOutcome::Applied));
    assert_eq!(pitch_at(&s, 2, 3), Some(70));
    assert!(!s.grid().is_occupied(GridPos::new(5, 3)));
    assert!(mock.calls_to(MockMethod::Interpolate).is_empty());
}

// ── Fill ─────────────────────────────────────────────────────────

#[test]
fn formation_fill_covers_whole_grid() {
    let (mut s, _) = session();
    s.apply(Edit::ExpandFirstSquare {
        sequence: melody(&[60]),
    })
    .unwrap();
    let r = s
        .apply(Edit::FillFormation {
            origin: GridPos::new(4, 3),
        })
        .unwrap();
    assert_eq!(r.result, Ok(EditOutcome::Applied));
    assert_eq!(s.grid().len(), 77);
    assert_eq!(pitch_at(&s, 0, 0), Some(61));
    assert_eq!(pitch_at(&s, 10, 0), Some(60));
    assert_eq!(pitch_at(&s, 0, 6), Some(62));
    assert_eq!(pitch_at(&s, 10, 6), Some(63));
    assert_eq!(s.formations().len(), 60);
}

#[test]
fn fill_with_missing_corner_is_rejected() {
    let (mut s, mock) = session();
    s.apply(Edit::ExpandFirstSquare {
        sequence: melody(&[60]),
    })
    .unwrap();
    s.apply(Edit::Remove {
        positions: vec![GridPos::new(5, 4)],
    })
    .unwrap();
    let history_len = s.history().len();

    let err = s
        .apply(Edit::FillFormation {
            origin: GridPos::new(4, 3),
        })
        .unwrap_err();
    assert_eq!(
        err,
        EditError::IncompleteFormation {
            missing: vec![GridPos::new(5, 4)]
        }
    );
    assert_eq!(
        err.user_message(),
        "Not all 4 squares have node sequences. Please draw a sequence."
    );
    assert!(!s.batch_lock().is_held());
    assert!(mock.calls_to(MockMethod::Bilinear).is_empty());
    assert_eq!(s.history().len(), history_len);
    assert_eq!(s.grid().len(), 3);
}

// ── History ──────────────────────────────────────────────────────

#[test]
fn undo_redo_and_branch_truncation() {
    let (mut s, _) = session();
    place(&mut s, 0, 0, 50);
    place(&mut s, 1, 0, 51);
    assert_eq!(s.history().len(), 3);

    assert!(s.undo().unwrap());
    assert_eq!(s.grid().len(), 2);
    assert!(!s.grid().is_occupied(GridPos::new(1, 0)));
    assert!(s.history().can_redo());

    place(&mut s, 2, 0, 52);
    assert!(!s.history().can_redo());
    assert_eq!(s.history().len(), 3);

    assert!(s.undo().unwrap());
    assert!(s.undo().unwrap());
    assert_eq!(s.grid().len(), 1);
    assert!(!s.undo().unwrap());

    assert!(s.redo().unwrap());
    assert!(s.redo().unwrap());
    assert_eq!(pitch_at(&s, 2, 0), Some(52));
    assert!(!s.grid().is_occupied(GridPos::new(1, 0)));
}

#[test]
fn generative_edit_is_one_history_step() {
    let (mut s, _) = session();
    place(&mut s, 5, 3, 70);
    place(&mut s, 4, 3, 72);
    let before = s.history().len();
    s.apply(Edit::Pull {
        origin: GridPos::new(5, 3),
        direction: Direction::Left,
        sequence: Some(melody(&[70])),
        strength: None,
    })
    .unwrap();
    assert_eq!(s.history().len(), before + 1);

    assert!(s.undo().unwrap());
    assert_eq!(pitch_at(&s, 5, 3), Some(70));
    assert_eq!(pitch_at(&s, 4, 3), Some(72));
    assert_eq!(s.grid().len(), 2);
}

#[test]
fn auto_snapshot_can_be_disabled() {
    let mock = Arc::new(MockSequenceService::new());
    let cfg = SessionConfig {
        auto_snapshot: false,
        ..config()
    };
    let mut s = Session::new(cfg, mock).unwrap();
    place(&mut s, 0, 0, 50);
    assert_eq!(s.history().len(), 1);
    assert!(!s.undo().unwrap());
}
