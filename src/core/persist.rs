//! Saving modified datasets, in place or behind a timestamped backup copy.
//!
//! The encoded dataset always goes to a temporary file next to the original and
//! is renamed over it, so a failed encode never leaves a half-written original.
//! In backup mode the untouched original is copied first; if that copy fails
//! the original is not overwritten. A symlinked original is written through:
//! the link stays and the file it points at is replaced.
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::io::codec::{CodecError, DatasetCodec};
use crate::io::dataset::Dataset;
use crate::types::PersistMode;

/// Errors encountered while persisting a dataset
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to create backup directory {path}: {source}")]
    BackupDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to back up {original} to {backup}: {source}")]
    Backup {
        original: PathBuf,
        backup: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Encode(#[from] CodecError),
    #[error("Failed to replace {path}: {source}")]
    Replace {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write `dataset` over `original` according to `mode`.
///
/// Returns the path of the backup copy when one was made.
pub fn persist(
    codec: &dyn DatasetCodec,
    dataset: &Dataset,
    original: &Path,
    mode: &PersistMode,
) -> Result<Option<PathBuf>, PersistError> {
    let backup = match mode {
        PersistMode::InPlace => None,
        PersistMode::Backup { dir } => Some(backup_original(original, dir)?),
    };

    let target = link_target(original)?;
    write_replacing(codec, dataset, &target)?;

    match &backup {
        Some(path) => info!("Saved {} (backup: {})", original.display(), path.display()),
        None => info!("Saved {} in place", original.display()),
    }
    Ok(backup)
}

/// Copy `original` into `dir` under a timestamped name that is not yet taken.
pub fn backup_original(original: &Path, dir: &Path) -> Result<PathBuf, PersistError> {
    fs::create_dir_all(dir).map_err(|source| PersistError::BackupDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let stamp = Local::now().format("%Y%m%d_%H%M%S_%6f").to_string();
    let mut attempt = 0usize;
    loop {
        let candidate = dir.join(backup_file_name(original, &stamp, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => {
                fs::copy(original, &candidate).map_err(|source| {
                    let _ = fs::remove_file(&candidate);
                    PersistError::Backup {
                        original: original.to_path_buf(),
                        backup: candidate.clone(),
                        source,
                    }
                })?;
                debug!("Backed up {} to {}", original.display(), candidate.display());
                return Ok(candidate);
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => {
                return Err(PersistError::Backup {
                    original: original.to_path_buf(),
                    backup: candidate,
                    source,
                });
            }
        }
    }
}

/// `<stem>.<stamp>[-N]<.suffix>`
pub fn backup_file_name(original: &Path, stamp: &str, attempt: usize) -> String {
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string());
    let suffix = original
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    if attempt == 0 {
        format!("{stem}.{stamp}{suffix}")
    } else {
        format!("{stem}.{stamp}-{attempt}{suffix}")
    }
}

/// The file a symlinked `original` points at, or `original` itself.
fn link_target(original: &Path) -> Result<PathBuf, PersistError> {
    let replace_err = |source| PersistError::Replace {
        path: original.to_path_buf(),
        source,
    };
    if fs::symlink_metadata(original).map_err(replace_err)?.file_type().is_symlink() {
        fs::canonicalize(original).map_err(replace_err)
    } else {
        Ok(original.to_path_buf())
    }
}

fn write_replacing(
    codec: &dyn DatasetCodec,
    dataset: &Dataset,
    original: &Path,
) -> Result<(), PersistError> {
    let parent = original
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staging = tempfile::Builder::new()
        .prefix(".dicomsar-")
        .tempfile_in(parent)
        .map_err(|source| PersistError::Replace {
            path: original.to_path_buf(),
            source,
        })?;

    codec.encode(dataset, staging.path())?;

    // The staging file is created owner-only; the rewritten file keeps the original's mode.
    let replace_err = |source| PersistError::Replace {
        path: original.to_path_buf(),
        source,
    };
    let permissions = fs::metadata(original).map_err(replace_err)?.permissions();
    fs::set_permissions(staging.path(), permissions).map_err(replace_err)?;

    staging
        .persist(original)
        .map_err(|err| PersistError::Replace {
            path: original.to_path_buf(),
            source: err.error,
        })?;
    Ok(())
}
