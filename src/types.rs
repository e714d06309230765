//! Shared types and enums used across dicomsar.
//! Includes the operating `RunMode` and the `PersistMode` used when saving
//! modified datasets.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RunMode {
    /// Print tag values
    Dump,
    /// Regex search-and-replace over tag values
    Sar,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Dump => write!(f, "dump"),
            RunMode::Sar => write!(f, "sar"),
        }
    }
}

/// Where a modified dataset goes
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum PersistMode {
    /// Overwrite the original file
    InPlace,
    /// Copy the untouched original into `dir` first, then overwrite the original
    Backup { dir: PathBuf },
}

impl std::fmt::Display for PersistMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistMode::InPlace => write!(f, "in-place"),
            PersistMode::Backup { dir } => write!(f, "backup ({})", dir.display()),
        }
    }
}
