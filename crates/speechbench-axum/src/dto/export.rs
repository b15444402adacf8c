//! DTO for the `Export` operation (§6) — delegated to an external renderer
//! in the source system; this adapter only defines the contract shape and
//! returns 501 until a renderer is wired in.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Pdf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub run_ids: Vec<uuid::Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResponse {
    pub message: String,
}
