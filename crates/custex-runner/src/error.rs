//! Runner error types.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use custex_core::FormatError;

/// Errors that abort a single script cycle.
///
/// None of these are fatal; the poller backs off and retries.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to start script {}: {source}", .script.display())]
    Spawn {
        script: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read script output: {0}")]
    Read(#[source] io::Error),

    #[error("invalid output on line {line}: {source}")]
    Format {
        line: usize,
        #[source]
        source: FormatError,
    },

    #[error("failed to wait for script: {0}")]
    Wait(#[source] io::Error),

    #[error("script did not finish within {0:?}")]
    Timeout(Duration),
}

pub type RunResult<T> = Result<T, RunError>;
