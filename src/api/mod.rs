//! High-level library API: the batch orchestrator. Discovers files, runs one
//! task per file on a bounded worker pool, and aggregates the per-file outcomes
//! into a `RunReport` on the calling thread. Prefer these entry points over the
//! lower-level `core` modules when embedding dicomsar.
use std::any::Any;
use std::fs::File;
use std::io::BufWriter;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use dicom::core::{Tag, VR};
use rayon::prelude::*;
use serde::{Serialize, Serializer};
use tracing::{debug, error, info, info_span, warn};

use crate::core::mutate::{ChangeRecord, TagFilter, mutate};
use crate::core::params::RunConfig;
use crate::core::persist::persist;
use crate::core::tags::TagSet;
use crate::error::{ERROR_TARGET, Error, Result};
use crate::io::codec::DatasetCodec;
use crate::io::dataset::{Dataset, Element};
use crate::io::discover::discover_files;
use crate::io::formatting::truncate;
use crate::types::RunMode;

/// One printed line of a dump
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpEntry {
    pub tag: Tag,
    pub keyword: Option<String>,
    pub vr: VR,
    pub value: String,
    /// Nesting level; 0 for top-level elements
    pub depth: usize,
}

impl DumpEntry {
    fn from_element(element: &Element, depth: usize) -> Self {
        Self {
            tag: element.tag(),
            keyword: element.keyword().map(str::to_string),
            vr: element.vr(),
            value: truncate(&element.value().render()),
            depth,
        }
    }
}

/// Stage at which a file task failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureStage {
    Processing,
    Persisting,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Processing => write!(f, "processing"),
            FailureStage::Persisting => write!(f, "persisting"),
        }
    }
}

/// Terminal state of one file task
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// The file did not decode as a dataset
    Skipped { reason: String },
    Dumped { entries: Vec<DumpEntry> },
    /// Search-and-replace finished; `changes` may be empty
    Mutated {
        changes: Vec<ChangeRecord>,
        backup: Option<PathBuf>,
    },
    Failed { stage: FailureStage, error: String },
}

/// Unit returned from a file task to the orchestrator
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub elapsed: Duration,
}

impl FileResult {
    pub fn success(&self) -> bool {
        matches!(
            self.outcome,
            FileOutcome::Dumped { .. } | FileOutcome::Mutated { .. }
        )
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, FileOutcome::Skipped { .. })
    }

    /// True iff at least one change was recorded
    pub fn modified(&self) -> bool {
        !self.changes().is_empty()
    }

    pub fn changes(&self) -> &[ChangeRecord] {
        match &self.outcome {
            FileOutcome::Mutated { changes, .. } => changes,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            FileOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Position of the aggregator within the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

/// Number of evenly spaced progress milestones in a run.
const PROGRESS_STEPS: usize = 20;

impl Progress {
    /// True on every 5% boundary and on the last file.
    pub fn is_milestone(&self) -> bool {
        let step = (self.total / PROGRESS_STEPS).max(1);
        self.completed == self.total || self.completed % step == 0
    }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Aggregated counters and timings of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub dry_run: bool,
    pub discovered: usize,
    pub processed: usize,
    pub modified: usize,
    /// Files that were not datasets
    pub skipped: usize,
    pub errors: usize,
    #[serde(serialize_with = "as_secs")]
    pub total_elapsed: Duration,
    /// Sum of per-file task times over processed files
    #[serde(serialize_with = "as_secs")]
    pub processing_time: Duration,
    #[serde(serialize_with = "as_secs")]
    pub average_per_file: Duration,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Local::now(),
            dry_run,
            discovered: 0,
            processed: 0,
            modified: 0,
            skipped: 0,
            errors: 0,
            total_elapsed: Duration::ZERO,
            processing_time: Duration::ZERO,
            average_per_file: Duration::ZERO,
        }
    }

    /// Fold one file result into the counters.
    pub fn record(&mut self, result: &FileResult) {
        match &result.outcome {
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { .. } => self.errors += 1,
            FileOutcome::Dumped { .. } | FileOutcome::Mutated { .. } => {
                self.processed += 1;
                if result.modified() {
                    self.modified += 1;
                }
                self.processing_time += result.elapsed;
                self.average_per_file = self.processing_time / self.processed as u32;
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.processed + self.skipped + self.errors
    }
}

/// Run a whole batch and return the aggregated report.
///
/// The configuration is validated first; a configuration error aborts before
/// any file is touched. `on_result` is called on the calling thread for every
/// file, in completion order.
pub fn run_batch<F>(config: &RunConfig, codec: &dyn DatasetCodec, mut on_result: F) -> Result<RunReport>
where
    F: FnMut(&FileResult, Progress),
{
    config.validate()?;
    let started = Instant::now();
    let mut report = RunReport::new(config.is_dry_run());

    let files = discover_files(&config.root, &config.exclude);
    report.discovered = files.len();
    if files.is_empty() {
        warn!("No files found to process");
        report.total_elapsed = started.elapsed();
        return Ok(report);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count)
        .thread_name(|index| format!("dicomsar-worker-{index}"))
        .build()
        .map_err(|e| Error::ThreadPool(e.to_string()))?;
    info!(
        "Processing {} files with {} workers ({} mode)",
        files.len(),
        config.worker_count,
        config.mode
    );

    let filter = config.tag_filter();
    let total = files.len();
    let (sender, receiver) = mpsc::channel::<FileResult>();

    thread::scope(|scope| {
        let (files, filter, pool) = (&files, &filter, &pool);
        scope.spawn(move || {
            pool.install(|| {
                files.par_iter().for_each_with(sender, |sender, path| {
                    let result = run_task(path, config, filter, codec);
                    // the receiver only goes away if the aggregator panicked
                    let _ = sender.send(result);
                });
            });
        });

        for (index, result) in receiver.iter().enumerate() {
            report.record(&result);
            let progress = Progress {
                completed: index + 1,
                total,
            };
            debug!("[{}/{}] {}", progress.completed, progress.total, result.path.display());
            on_result(&result, progress);
        }
    });

    report.total_elapsed = started.elapsed();
    info!(
        "Run complete: {} processed, {} modified, {} skipped, {} errors",
        report.processed, report.modified, report.skipped, report.errors
    );
    Ok(report)
}

/// Process a single file with `config`, outside of a batch.
pub fn process_file(path: &Path, config: &RunConfig, codec: &dyn DatasetCodec) -> FileResult {
    run_task(path, config, &config.tag_filter(), codec)
}

fn run_task(
    path: &Path,
    config: &RunConfig,
    filter: &TagFilter,
    codec: &dyn DatasetCodec,
) -> FileResult {
    let started = Instant::now();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        process_outcome(path, config, filter, codec)
    }))
    .unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        error!(target: ERROR_TARGET, "{}: task panicked: {message}", path.display());
        FileOutcome::Failed {
            stage: FailureStage::Processing,
            error: format!("task panicked: {message}"),
        }
    });
    FileResult {
        path: path.to_path_buf(),
        outcome,
        elapsed: started.elapsed(),
    }
}

fn process_outcome(
    path: &Path,
    config: &RunConfig,
    filter: &TagFilter,
    codec: &dyn DatasetCodec,
) -> FileOutcome {
    let span = info_span!("file", path = %path.display());
    let _entered = span.enter();

    let mut dataset = match codec.decode(path) {
        Ok(dataset) => dataset,
        Err(err) => {
            warn!(target: ERROR_TARGET, "{}: skipped: {err}", path.display());
            return FileOutcome::Skipped {
                reason: err.to_string(),
            };
        }
    };

    match (config.mode, &config.sar) {
        (RunMode::Dump, _) => FileOutcome::Dumped {
            entries: dump_entries(&dataset, config.tags.as_ref()),
        },
        (RunMode::Sar, None) => {
            error!(target: ERROR_TARGET, "{}: no search-and-replace options", path.display());
            FileOutcome::Failed {
                stage: FailureStage::Processing,
                error: "no search-and-replace options".to_string(),
            }
        }
        (RunMode::Sar, Some(sar)) => {
            let changes = mutate(&mut dataset, filter, &sar.substitution, sar.mutation_options());
            if changes.is_empty() || sar.dry_run {
                return FileOutcome::Mutated {
                    changes,
                    backup: None,
                };
            }
            match persist(codec, &dataset, path, &sar.persist) {
                Ok(backup) => FileOutcome::Mutated { changes, backup },
                Err(err) => {
                    error!(target: ERROR_TARGET, "{}: {err}", path.display());
                    FileOutcome::Failed {
                        stage: FailureStage::Persisting,
                        error: err.to_string(),
                    }
                }
            }
        }
    }
}

/// Entries to print for one dataset.
///
/// With a non-empty filter only the matching top-level elements are listed, in
/// tag order; otherwise the whole tree is listed depth first.
pub fn dump_entries(dataset: &Dataset, tags: Option<&TagSet>) -> Vec<DumpEntry> {
    match tags {
        Some(tags) if !tags.is_empty() => tags
            .iter()
            .filter_map(|tag| dataset.get(tag))
            .map(|element| DumpEntry::from_element(element, 0))
            .collect(),
        _ => {
            let mut entries = Vec::with_capacity(dataset.len());
            dataset.walk(&mut |element, depth| entries.push(DumpEntry::from_element(element, depth)));
            entries
        }
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    config: &'a RunConfig,
    report: &'a RunReport,
}

/// Write the configuration and report of a run as pretty-printed JSON.
pub fn write_report(path: &Path, config: &RunConfig, report: &RunReport) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &ReportDocument { config, report })?;
    Ok(())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dicom::core::{Tag, VR};

    use super::*;
    use crate::core::params::SarOptions;
    use crate::core::substitution::Substitution;
    use crate::io::dataset::ElementValue;
    use crate::testing::{
        FailingCodec, PanickingCodec, TextCodec, read_text_value, write_text_dataset,
    };
    use crate::types::PersistMode;

    const PATIENT_ID: Tag = Tag(0x0010, 0x0020);
    const PATIENT_NAME: Tag = Tag(0x0010, 0x0010);

    fn patient_filter() -> Option<TagSet> {
        Some([PATIENT_ID].into_iter().collect())
    }

    fn sar(dry_run: bool, persist: PersistMode) -> SarOptions {
        SarOptions {
            substitution: Substitution::new("^(.*)$", "GENHOSP\\1").unwrap(),
            dry_run,
            persist,
            force: false,
            allow_binary: false,
        }
    }

    /// Writes `count` datasets; every odd-numbered one already carries the prefix.
    fn populate(root: &Path, count: usize) {
        for i in 0..count {
            let id = if i % 2 == 1 {
                format!("GENHOSP{i}")
            } else {
                format!("{i}")
            };
            write_text_dataset(
                &root.join(format!("series{}/IM{i:04}", i % 3)),
                &[(PATIENT_ID, VR::LO, &id), (PATIENT_NAME, VR::PN, "Doe^John")],
            );
        }
    }

    fn collect(config: &RunConfig, codec: &dyn DatasetCodec) -> (RunReport, Vec<FileResult>) {
        let mut results = Vec::new();
        let report = run_batch(config, codec, |result, _| results.push(result.clone())).unwrap();
        (report, results)
    }

    #[test]
    fn aggregation_is_exact_with_fewer_workers_than_files() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 9);
        fs::write(dir.path().join("README.txt"), "not a dataset").unwrap();

        // already-prefixed values still match `^(.*)$`, so restrict to unprefixed ones
        let mut options = sar(false, PersistMode::InPlace);
        options.substitution = Substitution::new("^([0-9]+)$", "GENHOSP\\1").unwrap();
        let config = RunConfig::sar(dir.path(), patient_filter(), options).with_worker_count(2);

        let (report, results) = collect(&config, &TextCodec);
        assert_eq!(report.discovered, 10);
        assert_eq!(report.processed, 9);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors, 0);
        assert_eq!(report.modified, 5);
        assert_eq!(results.len(), 10);
        assert_eq!(
            report.modified,
            results.iter().filter(|result| result.modified()).count()
        );

        for i in 0..9 {
            let path = dir.path().join(format!("series{}/IM{i:04}", i % 3));
            assert_eq!(read_text_value(&path, PATIENT_ID).unwrap(), format!("GENHOSP{i}"));
        }
    }

    #[test]
    fn progress_counts_every_completion_once() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 6);
        let config = RunConfig::dump(dir.path(), patient_filter()).with_worker_count(3);

        let mut seen = Vec::new();
        run_batch(&config, &TextCodec, |_, progress| seen.push(progress)).unwrap();
        let completed: Vec<usize> = seen.iter().map(|p| p.completed).collect();
        assert_eq!(completed, (1..=6).collect::<Vec<_>>());
        assert!(seen.iter().all(|p| p.total == 6));
    }

    #[test]
    fn progress_milestones_fall_on_five_percent_steps() {
        let milestones: Vec<usize> = (1..=100)
            .map(|completed| Progress { completed, total: 100 })
            .filter(Progress::is_milestone)
            .map(|p| p.completed)
            .collect();
        assert_eq!(milestones, (1..=20).map(|i| i * 5).collect::<Vec<_>>());

        let small: Vec<bool> = (1..=3)
            .map(|completed| Progress { completed, total: 3 }.is_milestone())
            .collect();
        assert_eq!(small, vec![true, true, true]);
        assert!(Progress { completed: 41, total: 41 }.is_milestone());
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn undecodable_files_are_reported_on_the_error_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.dcm");
        fs::write(&path, "not a dataset").unwrap();
        let config = RunConfig::dump(dir.path(), patient_filter());

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            process_file(&path, &config, &TextCodec)
        });

        assert!(result.is_skipped());
        let logged = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains(ERROR_TARGET), "{logged}");
        assert!(logged.contains("corrupt.dcm: skipped"), "{logged}");
    }

    #[test]
    fn dump_lists_filtered_tags_once_and_never_writes() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 3);
        let before: Vec<Vec<u8>> = discover_files(dir.path(), &[])
            .iter()
            .map(|path| fs::read(path).unwrap())
            .collect();

        let config = RunConfig::dump(dir.path(), patient_filter()).with_worker_count(2);
        let (report, results) = collect(&config, &TextCodec);
        assert_eq!(report.processed, 3);
        assert_eq!(report.modified, 0);
        for result in &results {
            let FileOutcome::Dumped { entries } = &result.outcome else {
                panic!("dump outcome expected");
            };
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].tag, PATIENT_ID);
            assert_eq!(entries[0].keyword.as_deref(), Some("PatientID"));
        }

        let after: Vec<Vec<u8>> = discover_files(dir.path(), &[])
            .iter()
            .map(|path| fs::read(path).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn unfiltered_dump_walks_nested_items() {
        let item = Dataset::from_elements(vec![Element::text(PATIENT_ID, VR::LO, "inner")]);
        let dataset = Dataset::from_elements(vec![
            Element::text(PATIENT_NAME, VR::PN, "Doe^John"),
            Element::sequence(Tag(0x0008, 0x1115), vec![item]),
        ]);
        let entries = dump_entries(&dataset, None);
        let shape: Vec<(Tag, usize)> = entries.iter().map(|e| (e.tag, e.depth)).collect();
        assert_eq!(
            shape,
            vec![(PATIENT_NAME, 0), (Tag(0x0008, 0x1115), 0), (PATIENT_ID, 1)]
        );
        assert_eq!(entries[1].value, "Sequence (1 item)");
    }

    #[test]
    fn dry_run_reports_changes_but_leaves_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IM0001");
        write_text_dataset(&path, &[(PATIENT_ID, VR::LO, "123")]);
        let before = fs::read(&path).unwrap();

        let config = RunConfig::sar(dir.path(), patient_filter(), sar(true, PersistMode::InPlace));
        let (report, results) = collect(&config, &TextCodec);
        assert!(report.dry_run);
        assert_eq!(report.modified, 1);
        assert_eq!(results[0].changes()[0].old, "123");
        assert_eq!(results[0].changes()[0].new, "GENHOSP123");
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn backup_mode_keeps_the_original_and_is_not_rediscovered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IM0001");
        write_text_dataset(&path, &[(PATIENT_ID, VR::LO, "123")]);
        let backup_dir = dir.path().join("backup");

        let config = RunConfig::sar(
            dir.path(),
            patient_filter(),
            sar(false, PersistMode::Backup { dir: backup_dir.clone() }),
        );
        let (_, results) = collect(&config, &TextCodec);
        let FileOutcome::Mutated { backup: Some(backup), .. } = &results[0].outcome else {
            panic!("backup expected");
        };
        assert_eq!(read_text_value(backup, PATIENT_ID).unwrap(), "123");
        assert_eq!(read_text_value(&path, PATIENT_ID).unwrap(), "GENHOSP123");

        // a second run must not pick up the backup copy
        let mut second = sar(false, PersistMode::Backup { dir: backup_dir.clone() });
        second.substitution = Substitution::new("^GENHOSP", "SITE").unwrap();
        let config = RunConfig::sar(dir.path(), patient_filter(), second);
        let (report, _) = collect(&config, &TextCodec);
        assert_eq!(report.discovered, 1);
        assert_eq!(fs::read_dir(&backup_dir).unwrap().count(), 2);
    }

    #[test]
    fn persistence_failures_are_counted_as_errors() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 2);
        let config = RunConfig::sar(dir.path(), patient_filter(), sar(false, PersistMode::InPlace))
            .with_worker_count(2);

        let (report, results) = collect(&config, &FailingCodec);
        assert_eq!(report.errors, 2);
        assert_eq!(report.processed, 0);
        assert_eq!(report.modified, 0);
        assert!(results.iter().all(|result| matches!(
            result.outcome,
            FileOutcome::Failed { stage: FailureStage::Persisting, .. }
        )));
        assert!(results.iter().all(|result| !result.modified() && result.error().is_some()));
    }

    #[test]
    fn panicking_tasks_become_processing_errors() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 3);
        let config = RunConfig::dump(dir.path(), None).with_worker_count(2);

        let (report, results) = collect(&config, &PanickingCodec);
        assert_eq!(report.errors, 3);
        assert!(results.iter().all(|result| matches!(
            result.outcome,
            FileOutcome::Failed { stage: FailureStage::Processing, .. }
        )));
    }

    #[test]
    fn empty_tree_yields_an_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::dump(dir.path(), None);
        let mut calls = 0;
        let report = run_batch(&config, &TextCodec, |_, _| calls += 1).unwrap();
        assert_eq!(report.discovered, 0);
        assert_eq!(report.completed(), 0);
        assert_eq!(calls, 0);
    }

    #[test]
    fn configuration_errors_abort_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IM0001");
        write_text_dataset(&path, &[(PATIENT_ID, VR::LO, "123")]);
        let before = fs::read(&path).unwrap();

        let config = RunConfig::sar(dir.path(), None, sar(false, PersistMode::InPlace));
        let mut calls = 0;
        let err = run_batch(&config, &TextCodec, |_, _| calls += 1).unwrap_err();
        assert!(matches!(err, Error::UnfilteredSar));
        assert_eq!(calls, 0);
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn single_file_processing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IM0001");
        write_text_dataset(&path, &[(PATIENT_ID, VR::LO, "123")]);
        let config = RunConfig::sar(&path, patient_filter(), sar(false, PersistMode::InPlace));

        let result = process_file(&path, &config, &TextCodec);
        assert!(result.success());
        assert!(result.modified());
        let reread = TextCodec.decode(&path).unwrap();
        assert_eq!(
            reread.get(PATIENT_ID).unwrap().value(),
            &ElementValue::Text("GENHOSP123".into())
        );
    }

    #[test]
    fn report_file_holds_config_and_counters() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), 2);
        let config = RunConfig::dump(dir.path(), patient_filter());
        let (report, _) = collect(&config, &TextCodec);

        let out = dir.path().join("report.json");
        write_report(&out, &config, &report).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(json["config"]["mode"], "Dump");
        assert_eq!(json["report"]["processed"], 2);
    }

    #[test]
    fn report_serializes_durations_as_seconds() {
        let mut report = RunReport::new(false);
        report.record(&FileResult {
            path: PathBuf::from("IM0001"),
            outcome: FileOutcome::Dumped { entries: Vec::new() },
            elapsed: Duration::from_millis(500),
        });
        report.record(&FileResult {
            path: PathBuf::from("IM0002"),
            outcome: FileOutcome::Dumped { entries: Vec::new() },
            elapsed: Duration::from_millis(1500),
        });
        assert_eq!(report.average_per_file, Duration::from_secs(1));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["processed"], 2);
        assert_eq!(json["processing_time"], 2.0);
        assert_eq!(json["average_per_file"], 1.0);
    }
}
