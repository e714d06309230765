#![doc = r#"
DICOMSAR: batch dump and regex search-and-replace for DICOM datasets.

This crate walks a directory tree of DICOM files and either prints selected
element values (dump) or applies a regular-expression substitution to textual
element values (search-and-replace), validating every new value against its VR
length limit and saving modified files in place or behind a timestamped backup.
It powers the `dicomsar` CLI and can be embedded in your own Rust applications.

Stability
---------
The public library API is experimental in initial releases and may evolve.

Quick start: dump one tag across a tree
---------------------------------------
```rust,no_run
use dicomsar::{DicomCodec, RunConfig, resolve_tags, run_batch};
use dicom::dictionary_std::StandardDataDictionary;

fn main() -> dicomsar::Result<()> {
    let tags = resolve_tags("PatientID", &StandardDataDictionary);
    let config = RunConfig::dump("/data/studies", Some(tags));

    let report = run_batch(&config, &DicomCodec::new(), |result, _| {
        println!("{}", result.path.display());
    })?;
    println!("processed={} skipped={}", report.processed, report.skipped);
    Ok(())
}
```

Search-and-replace with backups
-------------------------------
```rust,no_run
use std::path::PathBuf;
use dicomsar::{DicomCodec, PersistMode, RunConfig, SarOptions, Substitution, resolve_tags, run_batch};
use dicom::dictionary_std::StandardDataDictionary;

fn main() -> dicomsar::Result<()> {
    let options = SarOptions {
        substitution: Substitution::new("^(.*)$", r"GENHOSP\1")?,
        dry_run: false,
        persist: PersistMode::Backup { dir: PathBuf::from("backup") },
        force: false,
        allow_binary: false,
    };
    let tags = resolve_tags("(0010,0020)", &StandardDataDictionary);
    let config = RunConfig::sar("/data/studies", Some(tags), options).with_worker_count(4);

    let report = run_batch(&config, &DicomCodec::new(), |result, _| {
        for change in result.changes() {
            println!("{}: '{}' -> '{}'", result.path.display(), change.old, change.new);
        }
    })?;
    println!("modified={} errors={}", report.modified, report.errors);
    Ok(())
}
```

Error handling
--------------
`run_batch` returns `dicomsar::Result<T>` and only fails on configuration
problems detected before any file is touched. Per-file problems are reported as
`FileOutcome` values and counted in the `RunReport`.

```rust,no_run
use dicomsar::{DicomCodec, Error, RunConfig, run_batch};

fn main() {
    let config = RunConfig::dump("/no/such/dir", None);
    match run_batch(&config, &DicomCodec::new(), |_, _| {}) {
        Ok(report) => println!("{} files", report.discovered),
        Err(Error::PathNotFound(path)) => eprintln!("missing: {}", path.display()),
        Err(other) => eprintln!("error: {other}"),
    }
}
```

Useful modules
--------------
- [`api`]: batch orchestration and per-file results.
- [`core`]: tag resolution, VR validation, mutation, persistence, run configuration.
- [`io`]: file discovery, the dataset model and the DICOM codec adapter.
- [`error`]: crate-level `Error` and `Result`.
"#]

// Core modules (public)
pub mod api;
pub mod core;
pub mod error;
pub mod io;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// Curated public API surface
// Types
pub use crate::core::mutate::{ChangeRecord, MutationOptions, TagFilter, mutate};
pub use crate::core::params::{RunConfig, SarOptions, resolve_tag_spec, resolve_worker_count};
pub use crate::core::persist::{PersistError, persist};
pub use crate::core::substitution::Substitution;
pub use crate::core::tags::{KeywordDictionary, TagSet, resolve_tags};
pub use crate::error::{Error, Result};
pub use crate::types::{PersistMode, RunMode};

// Codec and dataset model
pub use crate::io::{CodecError, Dataset, DatasetCodec, DicomCodec, Element, ElementValue};

// High-level API re-exports
pub use crate::api::{
    DumpEntry, FailureStage, FileOutcome, FileResult, Progress, RunReport, process_file,
    run_batch,
};
