//! # merge-upstream CLI
//!
//! Binary entry point. Parses arguments, checks the build environment and
//! hands off to the library's snapshot driver. Failures surface through
//! `anyhow` and exit with status 1.

mod cli;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    cli.execute()
}
