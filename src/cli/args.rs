use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dicomsar",
    version,
    about = "Batch dump and regex search-and-replace for DICOM files"
)]
#[command(group(ArgGroup::new("mode").required(true).args(["dump", "sar"])))]
pub struct CliArgs {
    /// Print tag values (all tags, or only those selected with --tag)
    #[arg(long)]
    pub dump: bool,

    /// Search and replace tag values with a regular expression
    #[arg(long)]
    pub sar: bool,

    /// File or directory to process (directories are searched recursively)
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// Tags to select. Accepts (GGGG,EEEE), GGGG,EEEE or keywords such as
    /// PatientID; several tags may be given separated by commas
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Number of worker threads (default: available cores minus 4, at least 1)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Regular expression to search for (SAR mode)
    #[arg(long = "regex_search", requires = "sar")]
    pub regex_search: Option<String>,

    /// Replacement template; \1, \g<name>, $1 and ${name} refer to groups (SAR mode)
    #[arg(long = "regex_replace", requires = "sar", allow_hyphen_values = true)]
    pub regex_replace: Option<String>,

    /// Report changes without writing any file
    #[arg(long, default_value_t = false, requires = "sar")]
    pub dry_run: bool,

    /// Overwrite files without keeping a backup copy
    #[arg(long, default_value_t = false, requires = "sar")]
    pub inplace: bool,

    /// Run SAR over every string-like element when no tag filter is given, or
    /// continue without a filter when --tag resolves to nothing
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Let an explicit --tag filter reach binary numeric elements (US, UL, FL, ...)
    #[arg(long, default_value_t = false, requires = "sar")]
    pub allow_binary: bool,

    /// Directory receiving timestamped copies of modified originals
    #[arg(long, default_value = "backup")]
    pub backup_dir: PathBuf,

    /// Directory for dicomsar.log and errors.log
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Log to the console only
    #[arg(long, default_value_t = false)]
    pub no_log_files: bool,

    /// Also write the final report as JSON to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}
