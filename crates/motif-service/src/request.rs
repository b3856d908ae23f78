//! Requests carried to the worker thread and the replies it sends back.

use std::time::Duration;

use motif_core::{RequestId, Sequence};

use crate::error::ServiceError;
use crate::service::SequenceService;

/// One generative call, with owned inputs.
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceRequest {
    /// See [`SequenceService::similar`].
    Similar {
        /// Source sequence.
        sequence: Sequence,
        /// Number of variants wanted.
        count: usize,
        /// Sampling temperature.
        temperature: f64,
    },
    /// See [`SequenceService::interpolate`].
    Interpolate {
        /// Start and end of the morph.
        endpoints: Box<[Sequence; 2]>,
        /// Number of frames, ends included.
        count: usize,
    },
    /// See [`SequenceService::bilinear_interpolate`].
    Bilinear {
        /// Corners as `[top_left, bottom_left, top_right, bottom_right]`.
        corners: Box<[Sequence; 4]>,
        /// Output columns.
        cols: u32,
        /// Output rows.
        rows: u32,
        /// Sampling temperature.
        temperature: f64,
    },
    /// See [`SequenceService::sample`].
    Sample {
        /// Number of samples.
        count: usize,
        /// Sampling temperature.
        temperature: f64,
        /// Quantization resolution of the samples.
        steps_per_quarter: u32,
        /// Tempo of the samples.
        qpm: f64,
    },
}

impl ServiceRequest {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Similar { .. } => "similar",
            Self::Interpolate { .. } => "interpolate",
            Self::Bilinear { .. } => "bilinear",
            Self::Sample { .. } => "sample",
        }
    }

    /// Run the call against `service`.
    pub fn run(&self, service: &dyn SequenceService) -> Result<Vec<Sequence>, ServiceError> {
        match self {
            Self::Similar {
                sequence,
                count,
                temperature,
            } => service.similar(sequence, *count, *temperature),
            Self::Interpolate { endpoints, count } => service.interpolate(endpoints, *count),
            Self::Bilinear {
                corners,
                cols,
                rows,
                temperature,
            } => service.bilinear_interpolate(corners, [*cols, *rows], *temperature),
            Self::Sample {
                count,
                temperature,
                steps_per_quarter,
                qpm,
            } => service.sample(*count, *temperature, *steps_per_quarter, *qpm),
        }
    }
}

/// The worker's answer to one request.
#[derive(Clone, Debug)]
pub struct ServiceReply {
    /// Id of the request this answers.
    pub id: RequestId,
    /// What the service returned.
    pub result: Result<Vec<Sequence>, ServiceError>,
    /// Wall-clock time spent inside the service.
    pub elapsed: Duration,
}
