//! Handlers for the Script API (§6: `ListScripts`, plus script authoring).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::{CreateScriptRequest, ScriptSummaryDto};
use crate::error::HttpError;
use crate::state::AppState;

pub async fn list_scripts(State(state): State<AppState>) -> Result<Json<Vec<ScriptSummaryDto>>, HttpError> {
    let scripts = state.script_repository.list_scripts().await?;
    Ok(Json(scripts.iter().map(ScriptSummaryDto::from).collect()))
}

pub async fn create_script(
    State(state): State<AppState>,
    Json(req): Json<CreateScriptRequest>,
) -> Result<(StatusCode, Json<ScriptSummaryDto>), HttpError> {
    if req.input_texts.is_empty() {
        return Err(HttpError::BadRequest("a script needs at least one input text".to_string()));
    }
    let script = state.script_repository.create_script(req.name, req.input_texts).await?;
    Ok((StatusCode::CREATED, Json(ScriptSummaryDto::from(&script))))
}
