//! Pulling cells apart.
//!
//! A pull on `origin` in `direction` looks at the neighbour one step in
//! that direction and at the cell one step the other way:
//!
//! - neighbour present, far side free: both cells move `strength` apart
//!   and the cells between them are filled with interpolation frames;
//! - neighbour present, far side occupied: nothing happens;
//! - no neighbour: the origin cell slides `strength` away from
//!   `direction` if that spot is free.
//!
//! Every target position is clamped to the grid.

use motif_core::{Axis, Direction, GridGeneration, GridPos, Sequence};
use motif_grid::{GridBounds, GridStore};
use motif_service::{quantize_or_original, SequenceService, ServiceError, ServiceRequest};

use crate::config::SessionConfig;
use crate::job::{is_stale, Begin, EditOutcome};

/// Moves cells apart and interpolates the gap.
#[derive(Clone, Debug)]
pub struct PullOperator {
    strength: u32,
    steps_per_quarter: u32,
}

impl PullOperator {
    /// Operator using the default strength and resolution in `config`.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            strength: config.pull_strength,
            steps_per_quarter: config.steps_per_quarter,
        }
    }

    /// Default distance each end moves.
    pub fn strength(&self) -> u32 {
        self.strength
    }

    /// Run the synchronous part of a pull.
    ///
    /// `sequence` is the caller's view of the origin's sequence and is
    /// what the origin carries after a two-cell pull. `strength`
    /// overrides the default when given and non-zero.
    pub fn begin(
        &self,
        grid: &mut GridStore,
        service: &dyn SequenceService,
        origin: GridPos,
        direction: Direction,
        sequence: Option<Sequence>,
        strength: Option<u32>,
    ) -> Begin<PullJob> {
        let strength = strength.filter(|&s| s > 0).unwrap_or(self.strength);
        let distance = i32::try_from(strength).unwrap_or(i32::MAX);
        let neighbour_pos = origin.step(direction, 1);
        let blocking_pos = origin.step(direction.opposite(), 1);
        let neighbour_seq = grid
            .get_square_at_position(neighbour_pos)
            .map(|c| c.sequence.clone());

        match neighbour_seq {
            Some(neighbour_seq) if !grid.is_occupied(blocking_pos) => self.spread(
                grid,
                service,
                origin,
                direction,
                distance,
                sequence,
                neighbour_seq,
            ),
            Some(_) => {
                tracing::debug!(%origin, %direction, "no space to pull apart");
                Begin::Done(EditOutcome::NoOp {
                    reason: "no space behind the pulled cell",
                })
            }
            None => Begin::Done(slide(grid, origin, direction, distance)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn spread(
        &self,
        grid: &mut GridStore,
        service: &dyn SequenceService,
        origin: GridPos,
        direction: Direction,
        distance: i32,
        sequence: Option<Sequence>,
        neighbour_seq: Option<Sequence>,
    ) -> Begin<PullJob> {
        if !grid.is_occupied(origin) {
            tracing::warn!(%origin, "source cell not found, cannot pull");
            return Begin::Done(EditOutcome::NoOp {
                reason: "source cell not found",
            });
        }
        let (Some(origin_seq), Some(neighbour_seq)) = (sequence, neighbour_seq) else {
            return Begin::Done(EditOutcome::NoOp {
                reason: "both cells need a sequence",
            });
        };

        let bounds = grid.bounds();
        let neighbour_pos = origin.step(direction, 1);
        grid.remove_squares(&[origin, neighbour_pos]);

        let new_origin = bounds.clamp(origin.step(direction.opposite(), distance));
        let new_neighbour = bounds.clamp(neighbour_pos.step(direction, distance));
        let _ = grid.place_square(new_origin, Some(origin_seq.clone()), false);
        let _ = grid.place_square(new_neighbour, Some(neighbour_seq.clone()), false);

        let gap = gap_positions(bounds, origin, direction.axis(), new_origin, new_neighbour);
        tracing::debug!(%origin, %direction, %new_origin, %new_neighbour, gap = gap.len(), "pulled apart");
        if gap.is_empty() {
            return Begin::Done(EditOutcome::Applied);
        }
        for &pos in &gap {
            let _ = grid.place_square(pos, None, true);
        }

        let origin_q = quantize_or_original(service, &origin_seq, self.steps_per_quarter);
        let neighbour_q = quantize_or_original(service, &neighbour_seq, self.steps_per_quarter);
        let origin_first = match direction.axis() {
            Axis::Horizontal => new_origin.x < new_neighbour.x,
            Axis::Vertical => new_origin.y < new_neighbour.y,
        };
        let endpoints = if origin_first {
            [origin_q, neighbour_q]
        } else {
            [neighbour_q, origin_q]
        };

        Begin::Pending(PullJob {
            gap,
            endpoints,
            generation: grid.generation(),
        })
    }
}

/// Slide a lone cell `distance` away from `direction`, if the clamped
/// target differs from `origin` and is free.
fn slide(grid: &mut GridStore, origin: GridPos, direction: Direction, distance: i32) -> EditOutcome {
    let Some(sequence) = grid.get_square_at_position(origin).map(|c| c.sequence.clone()) else {
        return EditOutcome::NoOp {
            reason: "source cell not found",
        };
    };
    let target = grid.bounds().clamp(origin.step(direction.opposite(), distance));
    if target == origin || grid.is_occupied(target) {
        return EditOutcome::NoOp {
            reason: "no free target position",
        };
    }
    grid.remove_square(origin);
    let _ = grid.place_square(target, sequence, false);
    tracing::debug!(%origin, %target, "slid cell");
    EditOutcome::Applied
}

/// Positions strictly between `a` and `b` along `axis`, in ascending
/// order. The cross-axis coordinate is taken from `origin`.
fn gap_positions(bounds: GridBounds, origin: GridPos, axis: Axis, a: GridPos, b: GridPos) -> Vec<GridPos> {
    let positions: Vec<GridPos> = match axis {
        Axis::Horizontal => (a.x.min(b.x) + 1..a.x.max(b.x))
            .map(|x| GridPos::new(x, origin.y))
            .collect(),
        Axis::Vertical => (a.y.min(b.y) + 1..a.y.max(b.y))
            .map(|y| GridPos::new(origin.x, y))
            .collect(),
    };
    debug_assert!(positions.iter().all(|&p| bounds.contains(p)));
    positions
}

/// A pull waiting for its interpolation frames.
#[derive(Debug)]
pub struct PullJob {
    gap: Vec<GridPos>,
    endpoints: [Sequence; 2],
    generation: GridGeneration,
}

impl PullJob {
    /// Placeholder positions, in ascending order along the pull axis.
    pub fn gap(&self) -> &[GridPos] {
        &self.gap
    }

    /// Interpolation ends, spatially first then last.
    pub fn endpoints(&self) -> &[Sequence; 2] {
        &self.endpoints
    }

    /// The grid generation the job was started against.
    pub fn generation(&self) -> GridGeneration {
        self.generation
    }

    /// `interpolate(endpoints, gap + 2)`.
    pub fn request(&self) -> ServiceRequest {
        ServiceRequest::Interpolate {
            endpoints: Box::new(self.endpoints.clone()),
            count: self.gap.len() + 2,
        }
    }

    /// Write frames `1..=gap` into the placeholders. Placeholders without
    /// a frame stay pending.
    pub fn complete(self, grid: &mut GridStore, reply: Result<Vec<Sequence>, ServiceError>) -> EditOutcome {
        if is_stale(grid, self.generation, "pull") {
            return EditOutcome::Discarded;
        }
        let frames = match reply {
            Ok(frames) => frames,
            Err(err) => {
                tracing::warn!("error generating interpolated sequences: {err}");
                return EditOutcome::Degraded {
                    reason: err.to_string(),
                };
            }
        };
        let mut filled = 0;
        for (i, &pos) in self.gap.iter().enumerate() {
            if let Some(frame) = frames.get(i + 1) {
                if grid.update_square(pos, Some(frame.clone()), false).is_ok() {
                    filled += 1;
                }
            }
        }
        if filled == self.gap.len() {
            EditOutcome::Applied
        } else {
            let reason = ServiceError::InvalidResponse {
                expected: self.gap.len() + 2,
                got: frames.len(),
            };
            tracing::warn!(filled, pending = self.gap.len() - filled, "{reason}");
            EditOutcome::Degraded {
                reason: reason.to_string(),
            }
        }
    }
}
