//! Formation fill: stretch one formation's corners over the whole grid.
//!
//! The four corner sequences of a formation seed a bilinear
//! interpolation sized to the full grid. On success the grid is cleared
//! and every position refilled: the grid's own corners receive the
//! original corner sequences, every other position its interpolated
//! sequence.

use motif_core::{GridGeneration, GridPos, Sequence};
use motif_grid::{GridBounds, GridStore};
use motif_service::{quantize_or_original, SequenceService, ServiceError, ServiceRequest};

use crate::config::SessionConfig;
use crate::error::EditError;
use crate::job::{is_stale, Begin, EditOutcome};

/// Fills the grid from a formation's four corners.
#[derive(Clone, Debug)]
pub struct FormationFillEngine {
    steps_per_quarter: u32,
    temperature: f64,
}

impl FormationFillEngine {
    /// Engine using the resolution and fill temperature in `config`.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            steps_per_quarter: config.steps_per_quarter,
            temperature: config.fill_temperature,
        }
    }

    /// Validate the formation at `origin` and prepare the bilinear request.
    ///
    /// Fails with [`EditError::IncompleteFormation`] when any of the four
    /// positions lacks a cell or a sequence; the grid is not touched.
    pub fn begin(
        &self,
        grid: &GridStore,
        service: &dyn SequenceService,
        origin: GridPos,
    ) -> Result<Begin<FillJob>, EditError> {
        let positions = [
            origin,
            GridPos::new(origin.x + 1, origin.y),
            GridPos::new(origin.x, origin.y + 1),
            GridPos::new(origin.x + 1, origin.y + 1),
        ];
        let corners = positions.map(|pos| {
            grid.get_square_at_position(pos)
                .and_then(|c| c.sequence.clone())
        });
        let missing: Vec<GridPos> = positions
            .iter()
            .zip(&corners)
            .filter(|(_, seq)| seq.is_none())
            .map(|(&pos, _)| pos)
            .collect();
        let [Some(tl), Some(tr), Some(bl), Some(br)] = corners else {
            tracing::warn!(%origin, missing = missing.len(), "formation is incomplete");
            return Err(EditError::IncompleteFormation { missing });
        };

        let q = |s: &Sequence| quantize_or_original(service, s, self.steps_per_quarter);
        let seeds = [q(&tl), q(&bl), q(&tr), q(&br)];
        tracing::debug!(%origin, "filling grid from formation");
        Ok(Begin::Pending(FillJob {
            originals: [tl, tr, bl, br],
            seeds,
            bounds: grid.bounds(),
            temperature: self.temperature,
            generation: grid.generation(),
        }))
    }
}

/// A formation fill waiting for its bilinear grid.
#[derive(Debug)]
pub struct FillJob {
    /// Unquantized corners: top-left, top-right, bottom-left, bottom-right.
    originals: [Sequence; 4],
    /// Quantized corners: top-left, bottom-left, top-right, bottom-right.
    seeds: [Sequence; 4],
    bounds: GridBounds,
    temperature: f64,
    generation: GridGeneration,
}

impl FillJob {
    /// The grid generation the job was started against.
    pub fn generation(&self) -> GridGeneration {
        self.generation
    }

    /// `bilinear_interpolate([tl, bl, tr, br], [cols, rows], temperature)`.
    pub fn request(&self) -> ServiceRequest {
        ServiceRequest::Bilinear {
            corners: Box::new(self.seeds.clone()),
            cols: self.bounds.cols(),
            rows: self.bounds.rows(),
            temperature: self.temperature,
        }
    }

    /// Clear the grid and refill it. A failed reply leaves the grid as it
    /// was.
    pub fn complete(
        self,
        grid: &mut GridStore,
        reply: Result<Vec<Sequence>, ServiceError>,
    ) -> Result<EditOutcome, EditError> {
        if is_stale(grid, self.generation, "fill") {
            return Ok(EditOutcome::Discarded);
        }
        let interpolated = reply.map_err(|err| {
            tracing::warn!("error during bilinear interpolation: {err}");
            EditError::Service(err)
        })?;

        grid.clear_grid();
        let corners = self.bounds.corners();
        let mut placed = 0usize;
        for (index, pos) in self.bounds.positions().enumerate() {
            let sequence = match corners.iter().position(|&c| c == pos) {
                Some(corner) => Some(&self.originals[corner]),
                None => interpolated.get(index),
            };
            if let Some(sequence) = sequence {
                if grid.place_square(pos, Some(sequence.clone()), false).is_ok() {
                    placed += 1;
                }
            }
        }
        tracing::debug!(placed, total = self.bounds.cell_count(), "formation fill placed cells");

        let expected = self.bounds.cell_count();
        if interpolated.len() < expected {
            Ok(EditOutcome::Degraded {
                reason: ServiceError::InvalidResponse {
                    expected,
                    got: interpolated.len(),
                }
                .to_string(),
            })
        } else {
            Ok(EditOutcome::Applied)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_test_utils::fixtures::{first_pitch, melody, unquantized_melody};
    use motif_test_utils::{MockCall, MockMethod, MockSequenceService};

    fn engine() -> FormationFillEngine {
        FormationFillEngine::from_config(&SessionConfig::default())
    }

    fn formation_grid(cols: u32, rows: u32) -> GridStore {
        let mut g = GridStore::new(GridBounds::new(cols, rows).unwrap());
        for (x, y, p) in [(1, 1, 60), (2, 1, 62), (1, 2, 64), (2, 2, 65)] {
            g.place_square(GridPos::new(x, y), Some(melody(&[p])), false)
                .unwrap();
        }
        g
    }

    fn pitch_at(g: &GridStore, x: i32, y: i32) -> Option<u8> {
        g.get_square_at_position(GridPos::new(x, y))
            .and_then(|c| c.sequence.as_ref())
            .and_then(first_pitch)
    }

    #[test]
    fn missing_corner_is_reported_without_mutation() {
        let mock = MockSequenceService::new();
        let mut g = formation_grid(4, 4);
        g.update_square(GridPos::new(2, 2), None, false).unwrap();
        let rev = g.revision();
        let err = engine().begin(&g, &mock, GridPos::new(1, 1)).unwrap_err();
        assert_eq!(
            err,
            EditError::IncompleteFormation {
                missing: vec![GridPos::new(2, 2)]
            }
        );
        assert_eq!(g.revision(), rev);
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn seeds_are_sent_as_tl_bl_tr_br() {
        let mock = MockSequenceService::new();
        let g = formation_grid(4, 4);
        let Begin::Pending(job) = engine().begin(&g, &mock, GridPos::new(1, 1)).unwrap() else {
            panic!("expected pending fill");
        };
        let reply = job.request().run(&mock);
        let calls = mock.calls_to(MockMethod::Bilinear);
        let MockCall::Bilinear {
            corners,
            dims,
            temperature,
        } = &calls[0]
        else {
            panic!("expected bilinear call");
        };
        let order: Vec<_> = corners.iter().filter_map(first_pitch).collect();
        assert_eq!(order, vec![60, 64, 62, 65]);
        assert_eq!(*dims, [4, 4]);
        assert_eq!(*temperature, 0.5);
        assert!(reply.is_ok());
    }

    #[test]
    fn grid_is_refilled_with_original_corners() {
        let mock = MockSequenceService::new();
        let mut g = formation_grid(5, 3);
        g.place_square(GridPos::new(4, 0), Some(melody(&[90])), false)
            .unwrap();
        let Begin::Pending(job) = engine().begin(&g, &mock, GridPos::new(1, 1)).unwrap() else {
            panic!("expected pending fill");
        };
        let reply = job.request().run(&mock);
        assert_eq!(job.complete(&mut g, reply), Ok(EditOutcome::Applied));

        assert_eq!(g.len(), 15);
        assert_eq!(pitch_at(&g, 0, 0), Some(60));
        assert_eq!(pitch_at(&g, 4, 0), Some(62));
        assert_eq!(pitch_at(&g, 0, 2), Some(64));
        assert_eq!(pitch_at(&g, 4, 2), Some(65));
        // Interior positions take interpolated[row * cols + col].
        assert_eq!(pitch_at(&g, 1, 0), Some(24 + 1));
        assert_eq!(pitch_at(&g, 2, 1), Some(24 + 7));
        assert_eq!(pitch_at(&g, 3, 2), Some(24 + 13));
    }

    #[test]
    fn corners_keep_unquantized_originals() {
        let mock = MockSequenceService::new();
        let mut g = formation_grid(3, 3);
        let raw = unquantized_melody(&[70, 72]);
        g.update_square(GridPos::new(1, 1), Some(raw.clone()), false)
            .unwrap();
        let Begin::Pending(job) = engine().begin(&g, &mock, GridPos::new(1, 1)).unwrap() else {
            panic!("expected pending fill");
        };
        let reply = job.request().run(&mock);
        job.complete(&mut g, reply).unwrap();
        let tl = g.get_square_at_position(GridPos::new(0, 0)).unwrap();
        assert_eq!(tl.sequence.as_ref(), Some(&raw));
    }

    #[test]
    fn service_failure_leaves_grid_untouched() {
        let mock = MockSequenceService::new();
        mock.fail(MockMethod::Bilinear);
        let mut g = formation_grid(4, 4);
        let before = g.snapshot_cells();
        let Begin::Pending(job) = engine().begin(&g, &mock, GridPos::new(1, 1)).unwrap() else {
            panic!("expected pending fill");
        };
        let reply = job.request().run(&mock);
        assert!(matches!(job.complete(&mut g, reply), Err(EditError::Service(_))));
        assert_eq!(g.snapshot_cells(), before);
    }

    #[test]
    fn short_reply_leaves_tail_empty() {
        let mock = MockSequenceService::new();
        mock.short_by(4);
        let mut g = formation_grid(4, 4);
        let Begin::Pending(job) = engine().begin(&g, &mock, GridPos::new(1, 1)).unwrap() else {
            panic!("expected pending fill");
        };
        let reply = job.request().run(&mock);
        assert!(matches!(
            job.complete(&mut g, reply),
            Ok(EditOutcome::Degraded { .. })
        ));
        // Rows 0..3 come from the 12 frames; row 3 only has its corners.
        assert_eq!(g.len(), 14);
        assert!(g.is_occupied(GridPos::new(0, 3)));
        assert!(g.is_occupied(GridPos::new(3, 3)));
        assert!(!g.is_occupied(GridPos::new(1, 3)));
        assert!(!g.is_occupied(GridPos::new(2, 3)));
    }
}
