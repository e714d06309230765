//! Command Line Interface (CLI) layer for dicomsar.
//!
//! This module defines argument parsing (`args`), error types (`errors`), log
//! setup (`logging`) and the orchestration logic (`runner`) that turns the
//! parsed options into a `RunConfig`, drives `dicomsar::run_batch`, and prints
//! dump output, changes and the final report.
//!
//! If you are embedding dicomsar into another application, prefer using the
//! library API (`dicomsar::api`) instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod logging;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
