use std::io::Write;

use dicom::dictionary_std::StandardDataDictionary;
use tracing::{debug, error, info};

use dicomsar::api::write_report;
use dicomsar::core::params::available_cores;
use dicomsar::io::formatting::format_tag;
use dicomsar::{
    DicomCodec, FileOutcome, FileResult, PersistMode, RunConfig, RunMode, RunReport, SarOptions,
    Substitution, resolve_tag_spec, resolve_worker_count, run_batch,
};

use super::args::CliArgs;
use super::errors::AppError;
use super::logging::{self, LogOptions};

const RULE_WIDTH: usize = 60;

/// Turn parsed arguments into a validated-ready run configuration.
pub fn build_config(args: &CliArgs) -> Result<RunConfig, AppError> {
    let tags = resolve_tag_spec(args.tag.as_deref(), &StandardDataDictionary, args.force)?;
    let worker_count = resolve_worker_count(args.threads, available_cores())?;

    let config = if args.sar {
        let search = args
            .regex_search
            .as_deref()
            .ok_or_else(|| AppError::MissingArgument {
                arg: "--regex_search".to_string(),
            })?;
        let replace = args
            .regex_replace
            .as_deref()
            .ok_or_else(|| AppError::MissingArgument {
                arg: "--regex_replace".to_string(),
            })?;
        let persist = if args.inplace {
            PersistMode::InPlace
        } else {
            PersistMode::Backup {
                dir: args.backup_dir.clone(),
            }
        };
        let options = SarOptions {
            substitution: Substitution::new(search, replace)?,
            dry_run: args.dry_run,
            persist,
            force: args.force,
            allow_binary: args.allow_binary,
        };
        RunConfig::sar(&args.path, tags, options)
    } else {
        RunConfig::dump(&args.path, tags)
    };

    // Backups from earlier runs are never dumped or rewritten, whatever the mode.
    let config = config
        .with_worker_count(worker_count)
        .with_exclude(&args.backup_dir);
    Ok(if args.no_log_files {
        config
    } else {
        config.with_exclude(&args.log_dir)
    })
}

/// Lines printed for one finished file, if any.
pub fn render_result(result: &FileResult, dry_run: bool) -> Option<String> {
    match &result.outcome {
        FileOutcome::Dumped { entries } if !entries.is_empty() => {
            let mut out = format!("\n{}:\n", result.path.display());
            for entry in entries {
                out.push_str(&format!(
                    "{}{} {} [{}]: {}\n",
                    "  ".repeat(entry.depth + 1),
                    format_tag(entry.tag),
                    entry.keyword.as_deref().unwrap_or("Unknown"),
                    entry.vr,
                    entry.value
                ));
            }
            Some(out)
        }
        FileOutcome::Mutated { changes, backup } if !changes.is_empty() => {
            let mut out = if dry_run {
                format!("\n[DRY RUN] {}:\n", result.path.display())
            } else {
                format!("\n{}:\n", result.path.display())
            };
            for change in changes {
                out.push_str(&format!(
                    "  {} {}: '{}' -> '{}'\n",
                    format_tag(change.tag),
                    change.keyword.as_deref().unwrap_or("Unknown"),
                    change.old,
                    change.new
                ));
            }
            if let Some(backup) = backup {
                out.push_str(&format!("  backup: {}\n", backup.display()));
            }
            Some(out)
        }
        _ => None,
    }
}

pub fn render_report(report: &RunReport, mode: RunMode) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = format!("\n{rule}\nEXECUTION REPORT\n{rule}\n");
    out.push_str(&format!("Files discovered: {}\n", report.discovered));
    out.push_str(&format!("Files processed: {}\n", report.processed));
    if mode == RunMode::Sar {
        out.push_str(&format!("Files modified: {}\n", report.modified));
        if report.dry_run {
            out.push_str("[DRY RUN MODE - No changes written]\n");
        }
    }
    out.push_str(&format!("Files skipped (not DICOM): {}\n", report.skipped));
    out.push_str(&format!("Errors: {}\n", report.errors));
    out.push_str(&format!(
        "Average processing time: {:.4}s per file\n",
        report.average_per_file.as_secs_f64()
    ));
    out.push_str(&format!(
        "Total execution time: {:.2}s\n",
        report.total_elapsed.as_secs_f64()
    ));
    out.push_str(&rule);
    out.push('\n');
    out
}

pub fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&LogOptions {
        verbose: args.verbose,
        dir: (!args.no_log_files).then_some(args.log_dir.as_path()),
    })?;

    let outcome = execute(&args);
    if let Err(err) = &outcome {
        if err.is_configuration() {
            error!("Configuration error: {err}");
        } else {
            error!("{err}");
        }
    }
    Ok(outcome?)
}

fn execute(args: &CliArgs) -> Result<(), AppError> {
    let config = build_config(args)?;
    debug!("Run configuration: {config:?}");
    info!("Using {} worker threads", config.worker_count);

    let dry_run = config.is_dry_run();
    let mut stdout = std::io::stdout().lock();
    let report = run_batch(&config, &DicomCodec::new(), |result, progress| {
        if let Some(text) = render_result(result, dry_run) {
            if let Err(err) = stdout.write_all(text.as_bytes()) {
                error!("Failed to write output: {err}");
            }
        }
        if progress.is_milestone() {
            info!("Progress: {}/{} files", progress.completed, progress.total);
        }
    })?;

    stdout.write_all(render_report(&report, config.mode).as_bytes())?;
    stdout.flush()?;

    if let Some(path) = &args.report {
        write_report(path, &config, &report)?;
        info!("Report written to {}", path.display());
    }
    Ok(())
}
