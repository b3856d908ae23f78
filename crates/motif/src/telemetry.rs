//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events. Binaries and tests that
//! want to see them call [`init_tracing`] once.

use std::fmt;
use std::io::IsTerminal;
use std::sync::OnceLock;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding the filter directives, e.g.
/// `motif_engine=debug,info`.
pub const LOG_ENV: &str = "MOTIF_LOG";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Install a global `fmt` subscriber filtered by [`LOG_ENV`], defaulting
/// to `info`.
pub fn init_tracing() -> Result<(), InitError> {
    INITIALISED
        .set(())
        .map_err(|_| InitError::AlreadyInitialised)?;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| InitError::Subscriber(e.to_string()))?;
    tracing::debug!(env = LOG_ENV, "tracing initialised");
    Ok(())
}

/// Errors from [`init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// [`init_tracing`] was already called in this process.
    AlreadyInitialised,
    /// Another global subscriber was installed first.
    Subscriber(String),
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyInitialised => write!(f, "tracing has already been initialised"),
            Self::Subscriber(reason) => write!(f, "failed to install subscriber: {reason}"),
        }
    }
}

impl std::error::Error for InitError {}
