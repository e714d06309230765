//! Recursive enumeration of candidate files under a root path.
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

/// Collect every regular file reachable from `root`, with or without an extension.
///
/// Symbolic links to files are included under their link path; links to
/// directories are not followed.
///
/// A file root yields itself; a missing root yields nothing. Directories listed in
/// `exclude` (typically the backup and log directories) are not descended into.
pub fn discover_files(root: &Path, exclude: &[PathBuf]) -> Vec<PathBuf> {
    if !root.exists() {
        warn!("Path does not exist: {}", root.display());
        return Vec::new();
    }
    if root.is_file() {
        return vec![root.to_path_buf()];
    }

    info!("Discovering files in: {}", root.display());
    let excluded: Vec<PathBuf> = exclude
        .iter()
        .filter_map(|dir| dir.canonicalize().ok())
        .collect();

    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !entry.file_type().is_dir()
                || entry
                    .path()
                    .canonicalize()
                    .map(|path| !excluded.contains(&path))
                    .unwrap_or(true)
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| {
            let file_type = entry.file_type();
            // symlinked files count, symlinked directories are not descended into
            file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    info!("Found {} files", files.len());
    files
}
