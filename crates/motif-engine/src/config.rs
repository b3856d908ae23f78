//! Session configuration, validation, and error types.
//!
//! [`SessionConfig`] is the input for constructing a
//! [`Session`](crate::session::Session).
//! [`validate()`](SessionConfig::validate) checks every field before any
//! thread is spawned.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use motif_core::{DEFAULT_QPM, STEPS_PER_QUARTER, TOTAL_STEPS};
use motif_grid::{GridBounds, GridError};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SessionConfig::validate()`] or session
/// construction.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `cols` or `rows` is zero.
    ZeroDimension {
        /// Configured columns.
        cols: u32,
        /// Configured rows.
        rows: u32,
    },
    /// The grid bounds are otherwise invalid.
    Grid(GridError),
    /// `pull_strength` is zero.
    InvalidPullStrength {
        /// The invalid value.
        value: u32,
    },
    /// A temperature is NaN, infinite, or not positive.
    InvalidTemperature {
        /// Which temperature.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// Step resolution or length is unusable.
    InvalidSteps {
        /// What went wrong.
        reason: String,
    },
    /// `sample_qpm` is NaN, infinite, or not positive.
    InvalidTempo {
        /// The invalid value.
        value: f64,
    },
    /// `worker_queue_capacity` is zero.
    WorkerQueueZero,
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroDimension { cols, rows } => {
                write!(f, "grid must be at least 1x1, got {cols}x{rows}")
            }
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::InvalidPullStrength { value } => {
                write!(f, "pull_strength must be at least 1, got {value}")
            }
            Self::InvalidTemperature { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::InvalidSteps { reason } => write!(f, "invalid steps: {reason}"),
            Self::InvalidTempo { value } => {
                write!(f, "sample_qpm must be finite and positive, got {value}")
            }
            Self::WorkerQueueZero => write!(f, "worker_queue_capacity must be at least 1"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for ConfigError {
    fn from(e: GridError) -> Self {
        match e {
            GridError::EmptyGrid { cols, rows } => Self::ZeroDimension { cols, rows },
            other => Self::Grid(other),
        }
    }
}

// ── SessionConfig ──────────────────────────────────────────────────

/// Everything a [`Session`](crate::session::Session) needs to know up
/// front.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Grid columns. Default: 11.
    pub cols: u32,
    /// Grid rows. Default: 7.
    pub rows: u32,
    /// Cells each end moves during a pull. Default: 3.
    pub pull_strength: u32,
    /// Temperature for first-square variants. Default: 0.75.
    pub similar_temperature: f64,
    /// Temperature for formation fill. Default: 0.5.
    pub fill_temperature: f64,
    /// Quantization resolution. Default: 4 (sixteenth notes).
    pub steps_per_quarter: u32,
    /// Length the seed sequence is normalized to. Default: 64.
    pub total_steps: u32,
    /// Temperature for seed sampling. Default: 1.0.
    pub sample_temperature: f64,
    /// Tempo for seed sampling. Default: 120.
    pub sample_qpm: f64,
    /// Bound of the worker request and reply channels. Default: 16.
    pub worker_queue_capacity: usize,
    /// Save one history snapshot after every edit that changed the grid.
    /// Default: true.
    pub auto_snapshot: bool,
    /// Maximum snapshots kept, `0` for unbounded. Default: 0.
    pub history_depth: usize,
    /// Upper bound on blocking waits for a service reply. `None` waits
    /// forever. Default: `None`.
    pub reply_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cols: 11,
            rows: 7,
            pull_strength: 3,
            similar_temperature: 0.75,
            fill_temperature: 0.5,
            steps_per_quarter: STEPS_PER_QUARTER,
            total_steps: TOTAL_STEPS,
            sample_temperature: 1.0,
            sample_qpm: DEFAULT_QPM,
            worker_queue_capacity: 16,
            auto_snapshot: true,
            history_depth: 0,
            reply_timeout: None,
        }
    }
}

impl SessionConfig {
    /// The grid bounds described by `cols` and `rows`.
    pub fn bounds(&self) -> Result<GridBounds, ConfigError> {
        Ok(GridBounds::new(self.cols, self.rows)?)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds()?;
        if self.pull_strength == 0 {
            return Err(ConfigError::InvalidPullStrength {
                value: self.pull_strength,
            });
        }
        for (name, value) in [
            ("similar_temperature", self.similar_temperature),
            ("fill_temperature", self.fill_temperature),
            ("sample_temperature", self.sample_temperature),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTemperature { name, value });
            }
        }
        if self.steps_per_quarter == 0 {
            return Err(ConfigError::InvalidSteps {
                reason: "steps_per_quarter must be at least 1".into(),
            });
        }
        if self.total_steps == 0 {
            return Err(ConfigError::InvalidSteps {
                reason: "total_steps must be at least 1".into(),
            });
        }
        if !self.sample_qpm.is_finite() || self.sample_qpm <= 0.0 {
            return Err(ConfigError::InvalidTempo {
                value: self.sample_qpm,
            });
        }
        if self.worker_queue_capacity == 0 {
            return Err(ConfigError::WorkerQueueZero);
        }
        Ok(())
    }
}
