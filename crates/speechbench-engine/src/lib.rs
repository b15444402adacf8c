//! Run orchestration, audio duration probing, and aggregation.
//!
//! This crate is the use-case layer: it depends on `speechbench-core`'s
//! ports and `speechbench-vendors`' adapters, and is depended on by
//! `speechbench-axum` and `speechbench-cli`. It owns no transport or
//! storage concerns of its own.

pub mod aggregation;
pub mod config;
pub mod duration;
pub mod engine;

pub use aggregation::{AggregationService, DashboardStats, PairingStats, Percentiles, ServiceMix};
pub use config::EngineConfig;
pub use duration::{DurationProbe, probe_duration};
pub use engine::Engine;
