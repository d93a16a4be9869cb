//! # glide-mirror CLI
//!
//! This is the binary entry point for the `glide-mirror` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initializing logging.
//! - Handing the run to the library and turning any failure into a non-zero
//!   exit with the full error chain.
//!
//! The mirroring logic lives in the `glide_mirror` library crate, keeping the
//! binary a thin wrapper.

mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
