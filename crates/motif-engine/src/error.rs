//! User-facing edit errors.

use std::error::Error;
use std::fmt;

use motif_core::GridPos;
use motif_service::ServiceError;

/// Message shown when a formation is filled before all of its corners
/// carry a sequence.
pub const INCOMPLETE_FORMATION_MESSAGE: &str =
    "Not all 4 squares have node sequences. Please draw a sequence.";

/// Why an edit could not be started or did not complete.
#[derive(Clone, Debug, PartialEq)]
pub enum EditError {
    /// Another edit is still in flight.
    Busy,
    /// A formation fill was requested but some corners have no sequence.
    IncompleteFormation {
        /// Corner positions lacking a cell or a sequence, in
        /// top-left, top-right, bottom-left, bottom-right order.
        missing: Vec<GridPos>,
    },
    /// The sequence service failed and no fallback applies.
    Service(ServiceError),
    /// The service worker has shut down.
    Shutdown,
    /// No service reply arrived within the configured timeout.
    Timeout,
}

impl EditError {
    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            Self::IncompleteFormation { .. } => INCOMPLETE_FORMATION_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "another edit is in progress"),
            Self::IncompleteFormation { missing } => {
                write!(f, "{INCOMPLETE_FORMATION_MESSAGE} (missing: ")?;
                for (i, pos) in missing.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{pos}")?;
                }
                write!(f, ")")
            }
            Self::Service(e) => write!(f, "sequence service: {e}"),
            Self::Shutdown => write!(f, "sequence service worker has shut down"),
            Self::Timeout => write!(f, "timed out waiting for the sequence service"),
        }
    }
}

impl Error for EditError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for EditError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}
