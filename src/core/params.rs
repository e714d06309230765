use std::path::PathBuf;

use serde::Serialize;
use tracing::warn;

use crate::core::mutate::{MutationOptions, TagFilter};
use crate::core::substitution::Substitution;
use crate::core::tags::{KeywordDictionary, TagSet, resolve_tags};
use crate::error::{Error, Result};
use crate::types::{PersistMode, RunMode};

/// Cores left free for discovery, aggregation and I/O when no worker count is given
pub const RESERVED_CORES: usize = 4;

/// Options that only apply to search-and-replace runs
#[derive(Debug, Clone, Serialize)]
pub struct SarOptions {
    pub substitution: Substitution,
    /// Report changes without writing them
    pub dry_run: bool,
    pub persist: PersistMode,
    /// Allow running without a tag filter
    pub force: bool,
    /// Let an explicit tag filter reach binary numeric elements
    pub allow_binary: bool,
}

impl SarOptions {
    pub fn mutation_options(&self) -> MutationOptions {
        MutationOptions {
            dry_run: self.dry_run,
            allow_binary: self.allow_binary,
        }
    }
}

/// Everything a batch run needs, threaded explicitly through the orchestrator and tasks
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub root: PathBuf,
    pub mode: RunMode,
    /// Resolved tag filter; `None` means no filter
    pub tags: Option<TagSet>,
    pub sar: Option<SarOptions>,
    pub worker_count: usize,
    /// Directories discovery must not descend into (backups, logs)
    pub exclude: Vec<PathBuf>,
}

impl RunConfig {
    /// Dump configuration with default worker count
    pub fn dump(root: impl Into<PathBuf>, tags: Option<TagSet>) -> Self {
        Self {
            root: root.into(),
            mode: RunMode::Dump,
            tags,
            sar: None,
            worker_count: default_worker_count(available_cores()),
            exclude: Vec::new(),
        }
    }

    /// Search-and-replace configuration with default worker count
    pub fn sar(root: impl Into<PathBuf>, tags: Option<TagSet>, sar: SarOptions) -> Self {
        let exclude = match &sar.persist {
            PersistMode::Backup { dir } => vec![dir.clone()],
            PersistMode::InPlace => Vec::new(),
        };
        Self {
            root: root.into(),
            mode: RunMode::Sar,
            tags,
            sar: Some(sar),
            worker_count: default_worker_count(available_cores()),
            exclude,
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Add a directory that discovery must not descend into. Duplicates are ignored.
    pub fn with_exclude(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if !self.exclude.contains(&dir) {
            self.exclude.push(dir);
        }
        self
    }

    pub fn tag_filter(&self) -> TagFilter {
        TagFilter::from_tags(self.tags.clone())
    }

    pub fn is_dry_run(&self) -> bool {
        self.sar.as_ref().is_some_and(|sar| sar.dry_run)
    }

    /// Checks that must pass before any file is touched.
    pub fn validate(&self) -> Result<()> {
        if !self.root.exists() {
            return Err(Error::PathNotFound(self.root.clone()));
        }
        if self.worker_count == 0 {
            return Err(Error::InvalidArgument {
                arg: "--threads",
                value: "0".to_string(),
            });
        }
        if self.mode == RunMode::Sar {
            let sar = self.sar.as_ref().ok_or(Error::MissingArgument {
                arg: "--regex_search/--regex_replace".to_string(),
            })?;
            let unfiltered = self.tags.as_ref().is_none_or(TagSet::is_empty);
            if unfiltered && !sar.force {
                return Err(Error::UnfilteredSar);
            }
        }
        Ok(())
    }
}

/// Resolve an optional `--tag` specification.
///
/// A specification that resolves to nothing is a configuration error unless
/// `force` is set, in which case the run proceeds without a filter.
pub fn resolve_tag_spec(
    spec: Option<&str>,
    dictionary: &dyn KeywordDictionary,
    force: bool,
) -> Result<Option<TagSet>> {
    let Some(spec) = spec else {
        return Ok(None);
    };
    let tags = resolve_tags(spec, dictionary);
    if !tags.is_empty() {
        return Ok(Some(tags));
    }
    if force {
        warn!("No tags resolved from '{spec}', continuing without a tag filter");
        Ok(None)
    } else {
        Err(Error::NoTagsResolved(spec.to_string()))
    }
}

pub fn available_cores() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Available cores minus the reserve, never below one
pub fn default_worker_count(available: usize) -> usize {
    available.saturating_sub(RESERVED_CORES).max(1)
}

pub fn resolve_worker_count(requested: Option<usize>, available: usize) -> Result<usize> {
    match requested {
        None => Ok(default_worker_count(available)),
        Some(0) => Err(Error::InvalidArgument {
            arg: "--threads",
            value: "0".to_string(),
        }),
        Some(count) => {
            if count > available {
                warn!("Requested {count} workers but only {available} cores are available");
            }
            Ok(count)
        }
    }
}
