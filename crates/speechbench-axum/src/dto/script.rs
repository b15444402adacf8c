//! DTOs for the Script API (§6's `ListScripts`).

use serde::Serialize;
use uuid::Uuid;

use speechbench_core::domain::Script;

#[derive(Debug, Clone, Serialize)]
pub struct ScriptSummaryDto {
    pub id: Uuid,
    pub name: String,
    pub item_count: usize,
}

impl From<&Script> for ScriptSummaryDto {
    fn from(script: &Script) -> Self {
        Self {
            id: script.id,
            name: script.name.clone(),
            item_count: script.item_count(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateScriptRequest {
    pub name: String,
    pub input_texts: Vec<String>,
}
