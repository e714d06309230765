use std::path::PathBuf;

use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to set up logging in {dir}: {reason}")]
    Logging { dir: PathBuf, reason: String },

    #[error("Missing required argument: {arg}")]
    MissingArgument { arg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Run(#[from] dicomsar::Error),
}

impl AppError {
    pub fn is_configuration(&self) -> bool {
        match self {
            AppError::MissingArgument { .. } => true,
            AppError::Run(err) => err.is_configuration(),
            AppError::Logging { .. } | AppError::Io(_) => false,
        }
    }
}
