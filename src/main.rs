//! CLI entry point for mosaic composition and catalog generation

use clap::Parser;
use std::process::ExitCode;
use tilemosaic::io::cli::{Cli, execute};
use tilemosaic::io::logging::init_logging;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error}");
            ExitCode::FAILURE
        }
    }
}
