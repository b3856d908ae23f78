//! Error types for the sequence service and its worker.

use motif_core::SequenceError;
use std::error::Error;
use std::fmt;

/// A failure reported by a [`SequenceService`](crate::SequenceService).
#[derive(Clone, Debug, PartialEq)]
pub enum ServiceError {
    /// Quantization failed.
    Quantization(SequenceError),
    /// The model failed to produce sequences.
    Generation {
        /// Description from the model.
        reason: String,
    },
    /// The model is not loaded or cannot be reached.
    Unavailable {
        /// Why the model is unavailable.
        reason: String,
    },
    /// The model answered with the wrong number of sequences.
    InvalidResponse {
        /// How many sequences were requested.
        expected: usize,
        /// How many came back.
        got: usize,
    },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quantization(e) => write!(f, "quantization failed: {e}"),
            Self::Generation { reason } => write!(f, "generation failed: {reason}"),
            Self::Unavailable { reason } => write!(f, "sequence service unavailable: {reason}"),
            Self::InvalidResponse { expected, got } => {
                write!(f, "expected {expected} sequences, service returned {got}")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Quantization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SequenceError> for ServiceError {
    fn from(e: SequenceError) -> Self {
        Self::Quantization(e)
    }
}

/// Error handing a request to the worker thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The worker thread has shut down.
    Shutdown,
    /// The request channel is full (back-pressure).
    ChannelFull,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "service worker has shut down"),
            Self::ChannelFull => write!(f, "service request channel full"),
        }
    }
}

impl Error for SubmitError {}

/// Error waiting for a worker reply.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplyError {
    /// No reply arrived within the allotted time.
    Timeout,
    /// The worker thread has shut down.
    Shutdown,
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timed out waiting for service reply"),
            Self::Shutdown => write!(f, "service worker has shut down"),
        }
    }
}

impl Error for ReplyError {}
