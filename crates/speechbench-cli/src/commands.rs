//! Top-level subcommands for the speechbench binary.

use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

/// Execution mode, mirrored from `speechbench_core::domain::RunMode` so
/// `clap` can derive parsing without pulling domain types into this crate's
/// argument definitions.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RunModeArg {
    Isolated,
    Chained,
}

/// Which capability an isolated run exercises.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceTypeArg {
    Tts,
    Stt,
}

/// Available commands for the speechbench binary.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server consumed by the dashboard.
    Serve {
        /// Override the port from `SPEECHBENCH_PORT`.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Execute a single benchmark run and wait for it to finish.
    Run {
        /// Isolated (single capability) or chained (TTS->STT pipeline).
        #[arg(long, value_enum)]
        mode: RunModeArg,

        /// Required in isolated mode: which capability is under test.
        #[arg(long, value_enum)]
        service: Option<ServiceTypeArg>,

        /// Required in chained mode: `tts_vendor:stt_vendor`.
        #[arg(long)]
        chain: Option<String>,

        /// Vendor labels to test, comma-separated (isolated mode only).
        #[arg(long, value_delimiter = ',')]
        vendors: Vec<String>,

        /// File with one input sentence per line.
        #[arg(long)]
        input: Option<PathBuf>,

        /// A single input sentence; repeatable.
        #[arg(long = "text")]
        texts: Vec<String>,

        /// Voice id forwarded to the TTS adapter.
        #[arg(long)]
        voice_id: Option<String>,

        /// Language hint forwarded to the adapters.
        #[arg(long)]
        language: Option<String>,

        /// How often to poll the run for completion, in milliseconds.
        #[arg(long, default_value_t = 500)]
        poll_interval_ms: u64,
    },
}
