//! Stub handler for `POST /export` (§6): export rendering is delegated to an
//! external renderer out of scope for this service, so this endpoint only
//! defines the request contract and always answers `501`.

use axum::Json;

use crate::dto::ExportRequest;
use crate::error::HttpError;

pub async fn export(Json(req): Json<ExportRequest>) -> Result<(), HttpError> {
    Err(HttpError::NotImplemented(format!(
        "export to {:?} for {} run(s) is handled by an external renderer, not this service",
        req.format,
        req.run_ids.len()
    )))
}
