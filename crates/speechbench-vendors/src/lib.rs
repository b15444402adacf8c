//! HTTP and deterministic-local vendor adapter implementations.
//!
//! Implements the `TtsAdapter`/`SttAdapter` ports from `speechbench-core`.
//! `TimedAdapter` applies the timeout/retry policy (§5, §7) uniformly over
//! any inner adapter; `VendorRegistry` resolves a vendor id string to the
//! registered adapter instance(s) (§4.2, §9's closed-registry redesign).

pub mod http_adapter;
pub mod local_adapter;
pub mod registry;
pub mod timed;

pub use http_adapter::{HttpVendorAdapter, HttpVendorConfig};
pub use local_adapter::LocalAdapter;
pub use registry::VendorRegistry;
pub use timed::TimedAdapter;
