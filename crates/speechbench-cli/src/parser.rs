//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Command-line interface for the speechbench benchmark harness.
#[derive(Parser)]
#[command(name = "speechbench")]
#[command(about = "Run and serve TTS/STT vendor-comparison benchmarks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}
