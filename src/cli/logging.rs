//! Log setup for the CLI.
//!
//! Three layers share one registry: the console (stderr), the run log
//! `dicomsar.log` and the error log `errors.log`, which only receives events
//! sent to the library's error target.
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dicomsar::error::ERROR_TARGET;
use tracing::Level;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use super::errors::AppError;

pub const RUN_LOG: &str = "dicomsar.log";
pub const ERROR_LOG: &str = "errors.log";
/// Size above which the run log is rolled over at start-up
pub const ROTATE_BYTES: u64 = 10 * 1024 * 1024;

pub struct LogOptions<'a> {
    pub verbose: bool,
    /// `None` logs to the console only
    pub dir: Option<&'a Path>,
}

pub fn init(options: &LogOptions<'_>) -> Result<(), AppError> {
    let level = if options.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let (run_log, error_log) = match options.dir {
        Some(dir) => {
            let (run_file, error_file) = open_log_files(dir)?;
            let run_log = fmt::layer()
                .with_writer(Mutex::new(run_file))
                .with_ansi(false)
                .with_filter(Targets::new().with_target("dicomsar", level));
            let error_log = fmt::layer()
                .with_writer(Mutex::new(error_file))
                .with_ansi(false)
                .with_target(false)
                .with_filter(Targets::new().with_target(ERROR_TARGET, Level::WARN));
            (Some(run_log), Some(error_log))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console)
        .with(run_log)
        .with(error_log)
        .try_init()
        .map_err(|e| AppError::Logging {
            dir: options.dir.map(Path::to_path_buf).unwrap_or_default(),
            reason: e.to_string(),
        })
}

fn open_log_files(dir: &Path) -> Result<(File, File), AppError> {
    let logging_error = |e: std::io::Error| AppError::Logging {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    };
    fs::create_dir_all(dir).map_err(logging_error)?;

    let run_path = dir.join(RUN_LOG);
    rotate_if_large(&run_path, ROTATE_BYTES).map_err(logging_error)?;
    let run_file = append(&run_path).map_err(logging_error)?;
    let error_file = append(&dir.join(ERROR_LOG)).map_err(logging_error)?;
    Ok((run_file, error_file))
}

fn append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Move `path` to `<path>.1` when it is larger than `limit` bytes.
pub fn rotate_if_large(path: &Path, limit: u64) -> std::io::Result<Option<PathBuf>> {
    match fs::metadata(path) {
        Ok(metadata) if metadata.len() > limit => {
            let mut rolled = path.as_os_str().to_owned();
            rolled.push(".1");
            let rolled = PathBuf::from(rolled);
            fs::rename(path, &rolled)?;
            Ok(Some(rolled))
        }
        Ok(_) => Ok(None),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
