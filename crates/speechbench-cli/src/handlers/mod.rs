//! Command handlers: one module per top-level subcommand. Each handler
//! receives the already-bootstrapped [`speechbench_axum::AxumContext`] and
//! delegates the actual work to the engine/repository ports.

pub mod run;
pub mod serve;
