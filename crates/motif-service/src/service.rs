//! The [`SequenceService`] trait.

use motif_core::Sequence;

use crate::error::ServiceError;

/// Generates and transforms sequences.
///
/// Implementations are shared across threads: the worker holds an
/// `Arc<dyn SequenceService>` and calls it from its own thread.
pub trait SequenceService: Send + Sync {
    /// Snap `sequence` to `steps_per_quarter` steps.
    ///
    /// Must return already-quantized input unchanged. The default uses
    /// the reference quantizer [`Sequence::quantized`].
    fn quantize(&self, sequence: &Sequence, steps_per_quarter: u32) -> Result<Sequence, ServiceError> {
        Ok(sequence.quantized(steps_per_quarter)?)
    }

    /// `count` variations of `sequence`.
    fn similar(
        &self,
        sequence: &Sequence,
        count: usize,
        temperature: f64,
    ) -> Result<Vec<Sequence>, ServiceError>;

    /// `count` frames morphing from `endpoints[0]` to `endpoints[1]`,
    /// both ends included.
    fn interpolate(&self, endpoints: &[Sequence; 2], count: usize) -> Result<Vec<Sequence>, ServiceError>;

    /// Row-major `rows * cols` sequences blended from four corners given
    /// as `[top_left, bottom_left, top_right, bottom_right]`.
    fn bilinear_interpolate(
        &self,
        corners: &[Sequence; 4],
        dims: [u32; 2],
        temperature: f64,
    ) -> Result<Vec<Sequence>, ServiceError>;

    /// `count` unconditional samples.
    fn sample(
        &self,
        count: usize,
        temperature: f64,
        steps_per_quarter: u32,
        qpm: f64,
    ) -> Result<Vec<Sequence>, ServiceError>;
}

/// Quantize through `service`, falling back to an unmodified copy of
/// `sequence` when quantization fails.
pub fn quantize_or_original(
    service: &dyn SequenceService,
    sequence: &Sequence,
    steps_per_quarter: u32,
) -> Sequence {
    if sequence.is_quantized() {
        return sequence.clone();
    }
    match service.quantize(sequence, steps_per_quarter) {
        Ok(q) => q,
        Err(err) => {
            tracing::warn!("quantization failed, using unquantized sequence: {err}");
            sequence.clone()
        }
    }
}
