//! Handler for `GET /artifacts/{kind}/{filename}` (§6's `GetArtifact`).
//!
//! Reconstructs the storage locator from the URL's `kind`/`filename` rather
//! than looking the artifact row up by id, so clients can link directly to
//! the path embedded in a [`crate::dto::run::RunItemDto`].

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::HttpError;
use crate::state::AppState;

pub async fn get_artifact(
    State(state): State<AppState>,
    Path((kind, filename)): Path<(String, String)>,
) -> Result<Response, HttpError> {
    let subdir = match kind.as_str() {
        "audio" => "audio",
        "transcript" | "transcripts" => "transcripts",
        other => return Err(HttpError::BadRequest(format!("unknown artifact kind: {other}"))),
    };

    let locator = format!("{subdir}/{filename}");
    let bytes = state.artifact_store.get(&locator).await?;

    let content_type = guess_content_type(&filename);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

fn guess_content_type(filename: &str) -> &'static str {
    if filename.ends_with(".wav") {
        "audio/wav"
    } else if filename.ends_with(".mp3") {
        "audio/mpeg"
    } else if filename.ends_with(".txt") {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}
