//! Handlers for the Run API (§6: `CreateRun`, `ListRuns`, `GetRun`).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use speechbench_core::domain::{Artifact, RunMode};

use crate::dto::run::{build_run_dto, build_run_item_dto};
use crate::dto::{CreateRunRequest, CreateRunResponse, RunDto};
use crate::error::HttpError;
use crate::input_source::resolve_input_texts;
use crate::state::AppState;

pub async fn create_run(
    State(state): State<AppState>,
    Json(req): Json<CreateRunRequest>,
) -> Result<(StatusCode, Json<CreateRunResponse>), HttpError> {
    let inputs = resolve_input_texts(&req.input_source, state.script_repository.as_ref()).await?;
    if inputs.is_empty() {
        return Err(HttpError::BadRequest("input source resolved to zero input texts".to_string()));
    }

    let config = req.to_run_config();
    let accepted_items_count = match req.mode {
        RunMode::Isolated => inputs.len() * req.vendors.len(),
        RunMode::Chained => inputs.len(),
    };

    let run_id = state.engine.create_run(req.mode, req.vendors.clone(), inputs, config).await?;

    Ok((StatusCode::CREATED, Json(CreateRunResponse { run_id, accepted_items_count })))
}

/// Lists every run with its items, skipping per-item artifact lookups —
/// `audio_path`/`transcript_path`/`transcript` are only populated by
/// [`get_run`], which a client calls once it knows which run it wants the
/// full detail for.
pub async fn list_runs(State(state): State<AppState>) -> Result<Json<Vec<RunDto>>, HttpError> {
    let runs = state.repository.list_runs(None).await?;
    let mut out = Vec::with_capacity(runs.len());
    for run in &runs {
        let items = state.repository.list_items_by_run(run.id).await?;
        let metrics = state.repository.list_metrics_by_run(run.id).await?;
        let mut item_dtos = Vec::with_capacity(items.len());
        for item in &items {
            item_dtos.push(build_run_item_dto(item, &metrics, None, None));
        }
        out.push(build_run_dto(run, item_dtos));
    }
    Ok(Json(out))
}

pub async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<Json<RunDto>, HttpError> {
    let run = state.repository.get_run(id).await?;
    let items = state.repository.list_items_by_run(id).await?;
    let metrics = state.repository.list_metrics_by_run(id).await?;

    let mut item_dtos = Vec::with_capacity(items.len());
    for item in &items {
        let audio_artifact = fetch_artifact(&state, item.audio_artifact_id).await?;
        let transcript_artifact = match fetch_artifact(&state, item.transcript_artifact_id).await? {
            Some(artifact) => {
                let bytes = state.artifact_store.get(&artifact.locator).await?;
                let text = String::from_utf8_lossy(&bytes).into_owned();
                Some((artifact, text))
            }
            None => None,
        };

        item_dtos.push(build_run_item_dto(
            item,
            &metrics,
            audio_artifact.as_ref(),
            transcript_artifact.as_ref().map(|(a, t)| (a, t.as_str())),
        ));
    }

    Ok(Json(build_run_dto(&run, item_dtos)))
}

async fn fetch_artifact(
    state: &AppState,
    artifact_id: Option<speechbench_core::domain::ArtifactId>,
) -> Result<Option<Artifact>, HttpError> {
    match artifact_id {
        Some(id) => Ok(Some(state.repository.get_artifact(id).await?)),
        None => Ok(None),
    }
}
