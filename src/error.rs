//! Error types for the logging façade
//!
//! Setup-time errors (`set_output`, backend `init`) are returned to the
//! caller. Per-write errors are caught by the façade and reported to stderr
//! so a failing sink can never crash or abort application logic.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by façade setup and backend writes.
#[derive(Debug, Error)]
pub enum Error {
    /// The adapter name is not present in the registry.
    #[error("unknown adapter {0:?} (forgotten register?)")]
    UnknownAdapter(String),

    /// An adapter with this name is already active on the façade.
    #[error("duplicate adapter {0:?}")]
    DuplicateAdapter(String),

    /// The file adapter config did not supply a target path.
    #[error("file adapter config must set \"filename\"")]
    MissingFilename,

    /// The adapter config payload was malformed.
    #[error("invalid adapter config: {0}")]
    InvalidConfig(String),

    /// The log file could not be opened or created.
    #[error("failed to open log file {path:?}")]
    FileOpenFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A write to the backend's sink failed.
    #[error("write failed")]
    WriteFailure(#[source] std::io::Error),

    /// Archiving the current log file during rotation failed.
    #[error("failed to rotate log file {path:?}")]
    RotationFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidConfig(err.to_string())
    }
}
