//! Composition root for the speechbench binary: CLI argument parsing and
//! command dispatch. Bootstrapping (wiring concrete adapters and
//! repositories) happens in `main.rs` via `speechbench_axum::bootstrap`, the
//! only place this binary's infrastructure is assembled.

pub mod commands;
pub mod handlers;
pub mod parser;

pub use commands::Commands;
pub use parser::Cli;
