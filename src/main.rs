//! dicomsar CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, run the batch in
//! dump or search-and-replace mode, and exit with appropriate status.
//! For programmatic use, prefer the library API (`dicomsar::api`).

use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();
    cli::run(args)
}
