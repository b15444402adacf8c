//! Data Transfer Objects for the HTTP API contract (§6).
//!
//! These decouple the stable wire format from internal domain types, so a
//! domain refactor never silently changes the JSON clients depend on.

pub mod export;
pub mod run;
pub mod script;
pub mod stats;

pub use export::{ExportFormat, ExportRequest, ExportResponse};
pub use run::{BatchFormat, ChainPairingDto, CreateRunRequest, CreateRunResponse, InputSource, RunDto, RunItemDto};
pub use script::{CreateScriptRequest, ScriptSummaryDto};
pub use stats::{DashboardResponse, PairingDto, PercentileDto};
