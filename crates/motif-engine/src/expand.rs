//! First-square expansion.
//!
//! When the grid holds exactly one cell and that cell receives a
//! sequence with notes, three variations are generated and placed to its
//! left, below-left and below, completing a 2×2 block:
//!
//! ```text
//!   (fx-1, fy)    (fx, fy)      <- seed
//!   (fx-1, fy+1)  (fx, fy+1)
//! ```

use motif_core::{Direction, GridGeneration, GridPos, Sequence};
use motif_grid::GridStore;
use motif_service::{SequenceService, ServiceError, ServiceRequest};

use crate::config::SessionConfig;
use crate::error::EditError;
use crate::job::{is_stale, Begin, EditOutcome};

/// Number of variants placed around the seed.
pub const VARIANT_COUNT: usize = 3;

/// Grows a lone seed cell into a 2×2 block.
#[derive(Clone, Debug)]
pub struct FirstSquareExpander {
    steps_per_quarter: u32,
    total_steps: u32,
    temperature: f64,
    sample_temperature: f64,
    sample_qpm: f64,
}

impl FirstSquareExpander {
    /// Expander using the resolution and temperatures in `config`.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            steps_per_quarter: config.steps_per_quarter,
            total_steps: config.total_steps,
            temperature: config.similar_temperature,
            sample_temperature: config.sample_temperature,
            sample_qpm: config.sample_qpm,
        }
    }

    /// Write `sequence` into the lone cell and prepare the variant request.
    ///
    /// Does nothing unless the grid has exactly one cell and `sequence`
    /// has at least one note.
    pub fn begin(
        &self,
        grid: &mut GridStore,
        service: &dyn SequenceService,
        sequence: Sequence,
    ) -> Begin<ExpandJob> {
        if !sequence.has_notes() {
            tracing::debug!("no notes in sequence, skipping first-square expansion");
            return Begin::Done(EditOutcome::NoOp {
                reason: "sequence has no notes",
            });
        }
        let Some(seed) = grid.sole_cell().map(|c| c.pos) else {
            tracing::debug!(cells = grid.len(), "grid does not hold a lone seed cell");
            return Begin::Done(EditOutcome::NoOp {
                reason: "grid does not hold exactly one cell",
            });
        };

        let normalized = self.normalize(service, &sequence);
        if grid.update_square(seed, Some(sequence), false).is_err() {
            return Begin::Done(EditOutcome::NoOp {
                reason: "seed cell vanished",
            });
        }
        tracing::debug!(%seed, notes = normalized.notes.len(), "expanding first square");
        Begin::Pending(ExpandJob {
            seed,
            normalized,
            temperature: self.temperature,
            generation: grid.generation(),
        })
    }

    /// Check the grid before spending a service call on a sampled seed.
    pub fn begin_sample(&self, grid: &GridStore) -> Begin<SampleJob> {
        if grid.sole_cell().is_none() {
            return Begin::Done(EditOutcome::NoOp {
                reason: "grid does not hold exactly one cell",
            });
        }
        Begin::Pending(SampleJob {
            temperature: self.sample_temperature,
            steps_per_quarter: self.steps_per_quarter,
            qpm: self.sample_qpm,
            generation: grid.generation(),
        })
    }

    /// Quantize if needed, then force the configured length and drop
    /// notes that do not fit. Falls back to the untouched input when
    /// quantization fails.
    pub fn normalize(&self, service: &dyn SequenceService, sequence: &Sequence) -> Sequence {
        let quantized = if sequence.is_quantized() {
            sequence.clone()
        } else {
            match service.quantize(sequence, self.steps_per_quarter) {
                Ok(q) => q,
                Err(err) => {
                    tracing::warn!("could not quantize seed, using original: {err}");
                    return sequence.clone();
                }
            }
        };
        quantized.normalized(self.total_steps)
    }
}

/// The three positions filled around `seed`, in variant order.
pub fn expansion_targets(seed: GridPos) -> [GridPos; VARIANT_COUNT] {
    let left = seed.step(Direction::Left, 1);
    [
        left,
        left.step(Direction::Down, 1),
        seed.step(Direction::Down, 1),
    ]
}

/// A first-square expansion waiting for its variants.
#[derive(Debug)]
pub struct ExpandJob {
    seed: GridPos,
    normalized: Sequence,
    temperature: f64,
    generation: GridGeneration,
}

impl ExpandJob {
    /// Position of the seed cell.
    pub fn seed(&self) -> GridPos {
        self.seed
    }

    /// The normalized seed sent to the service.
    pub fn normalized(&self) -> &Sequence {
        &self.normalized
    }

    /// The grid generation the job was started against.
    pub fn generation(&self) -> GridGeneration {
        self.generation
    }

    /// `similar(normalized, 3, temperature)`.
    pub fn request(&self) -> ServiceRequest {
        ServiceRequest::Similar {
            sequence: self.normalized.clone(),
            count: VARIANT_COUNT,
            temperature: self.temperature,
        }
    }

    /// Place the variants. Missing variants are replaced by copies of the
    /// normalized seed; out-of-bounds targets are skipped.
    pub fn complete(
        self,
        grid: &mut GridStore,
        reply: Result<Vec<Sequence>, ServiceError>,
    ) -> EditOutcome {
        if is_stale(grid, self.generation, "expand") {
            return EditOutcome::Discarded;
        }
        let (mut variants, problem) = match reply {
            Ok(v) if v.len() >= VARIANT_COUNT => (v, None),
            Ok(v) => {
                let got = v.len();
                (
                    v,
                    Some(ServiceError::InvalidResponse {
                        expected: VARIANT_COUNT,
                        got,
                    }),
                )
            }
            Err(err) => (Vec::new(), Some(err)),
        };
        if let Some(err) = &problem {
            tracing::warn!("could not generate similar sequences, using seed copies: {err}");
        }
        variants.resize(VARIANT_COUNT, self.normalized.clone());

        for (pos, variant) in expansion_targets(self.seed).into_iter().zip(variants) {
            // Out-of-bounds targets are logged by the store and skipped.
            let _ = grid.place_square(pos, Some(variant), false);
        }
        match problem {
            None => EditOutcome::Applied,
            Some(err) => EditOutcome::Degraded {
                reason: err.to_string(),
            },
        }
    }
}

/// A seed sample waiting for the service.
#[derive(Debug)]
pub struct SampleJob {
    temperature: f64,
    steps_per_quarter: u32,
    qpm: f64,
    generation: GridGeneration,
}

impl SampleJob {
    /// The grid generation the job was started against.
    pub fn generation(&self) -> GridGeneration {
        self.generation
    }

    /// `sample(1, temperature, steps_per_quarter, qpm)`.
    pub fn request(&self) -> ServiceRequest {
        ServiceRequest::Sample {
            count: 1,
            temperature: self.temperature,
            steps_per_quarter: self.steps_per_quarter,
            qpm: self.qpm,
        }
    }

    /// The sampled seed, or `None` when the grid was replaced meanwhile.
    pub fn complete(
        self,
        grid: &GridStore,
        reply: Result<Vec<Sequence>, ServiceError>,
    ) -> Result<Option<Sequence>, EditError> {
        if is_stale(grid, self.generation, "sample") {
            return Ok(None);
        }
        let mut samples = reply?;
        if samples.is_empty() {
            return Err(EditError::Service(ServiceError::InvalidResponse {
                expected: 1,
                got: 0,
            }));
        }
        Ok(Some(samples.swap_remove(0)))
    }
}
