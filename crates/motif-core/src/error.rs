//! Error types for sequence manipulation.

use std::error::Error;
use std::fmt;

/// Errors from the reference quantizer in [`Sequence::quantized`](crate::Sequence::quantized).
#[derive(Clone, Debug, PartialEq)]
pub enum SequenceError {
    /// `steps_per_quarter` was zero.
    ZeroStepsPerQuarter,
    /// The tempo is zero, negative or not finite.
    InvalidTempo {
        /// The offending quarter-notes-per-minute value.
        qpm: f64,
    },
    /// A note has a negative, non-finite or inverted time span, or ends
    /// past the last representable step.
    InvalidNoteTiming {
        /// Index of the note within the sequence.
        index: usize,
        /// Start time in seconds.
        start_time: f64,
        /// End time in seconds.
        end_time: f64,
    },
}

impl fmt::Display for SequenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroStepsPerQuarter => write!(f, "steps_per_quarter must be at least 1"),
            Self::InvalidTempo { qpm } => write!(f, "invalid tempo {qpm} qpm"),
            Self::InvalidNoteTiming {
                index,
                start_time,
                end_time,
            } => write!(
                f,
                "note {index} has invalid timing [{start_time}, {end_time}]"
            ),
        }
    }
}

impl Error for SequenceError {}
