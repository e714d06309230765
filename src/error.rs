//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, codec, and persistence errors, and provides semantic variants
//! for configuration problems detected before any file is processed.
use std::path::PathBuf;

use thiserror::Error;

/// `tracing` target of the dedicated error channel. Per-file and per-element
/// failures are emitted with this target so they can be routed to their own log.
pub const ERROR_TARGET: &str = "dicomsar::errors";

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] crate::io::CodecError),

    #[error("Persistence error: {0}")]
    Persist(#[from] crate::core::persist::PersistError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {arg}={value}")]
    InvalidArgument { arg: &'static str, value: String },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("Invalid search pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Invalid replacement template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("No tags could be resolved from '{0}' (use --force to run without a tag filter)")]
    NoTagsResolved(String),

    #[error("SAR mode without --tag requires --force (it rewrites every string-like element)")]
    UnfilteredSar,

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

impl Error {
    /// True for errors detected while validating the run configuration,
    /// before any file has been touched.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. }
                | Error::MissingArgument { .. }
                | Error::InvalidRegex { .. }
                | Error::InvalidTemplate { .. }
                | Error::PathNotFound(_)
                | Error::NoTagsResolved(_)
                | Error::UnfilteredSar
        )
    }
}
