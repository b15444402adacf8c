//! Row mapping helpers for `SQLite` queries.
//!
//! Enum-valued columns (`mode`, `status`, `kind`) and free-form structures
//! (`config`, `sidecar`, `vendors`) are stored as JSON text and round-tripped
//! through `serde_json`, rather than hand-rolled string matches — the domain
//! types already derive `Serialize`/`Deserialize` for the HTTP layer, so this
//! reuses that contract instead of inventing a second one.

use chrono::{DateTime, Utc};
use speechbench_core::RepositoryError;
use speechbench_core::domain::{
    Artifact, ArtifactKind, Metric, MetricUnit, Run, RunConfig, RunItem, RunItemSidecar,
    RunItemStatus, RunMode, RunStatus, ScriptItem, StoredMetric,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

fn storage_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn serde_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Serialization(e.to_string())
}

pub const RUN_SELECT_COLUMNS: &str =
    "id, created_at, mode, vendors, config, status, started_at, finished_at";

pub const RUN_ITEM_SELECT_COLUMNS: &str = "id, run_id, input_text, vendor_label, status, audio_artifact_id, transcript_artifact_id, sidecar, failure_reason";

pub const ARTIFACT_SELECT_COLUMNS: &str = "id, run_item_id, kind, content_type, locator, byte_len";

pub const SCRIPT_ITEM_SELECT_COLUMNS: &str = "id, script_id, position, text";

pub fn row_to_run(row: &SqliteRow) -> Result<Run, RepositoryError> {
    let mode_json: String = row.try_get("mode").map_err(storage_err)?;
    let vendors_json: String = row.try_get("vendors").map_err(storage_err)?;
    let config_json: String = row.try_get("config").map_err(storage_err)?;
    let status_json: String = row.try_get("status").map_err(storage_err)?;

    Ok(Run {
        id: row.try_get("id").map_err(storage_err)?,
        created_at: parse_timestamp(row.try_get("created_at").map_err(storage_err)?)?,
        mode: serde_json::from_str::<RunMode>(&mode_json).map_err(serde_err)?,
        vendors: serde_json::from_str::<Vec<String>>(&vendors_json).map_err(serde_err)?,
        config: serde_json::from_str::<RunConfig>(&config_json).map_err(serde_err)?,
        status: serde_json::from_str::<RunStatus>(&status_json).map_err(serde_err)?,
        started_at: row
            .try_get::<Option<String>, _>("started_at")
            .map_err(storage_err)?
            .map(parse_timestamp)
            .transpose()?,
        finished_at: row
            .try_get::<Option<String>, _>("finished_at")
            .map_err(storage_err)?
            .map(parse_timestamp)
            .transpose()?,
    })
}

pub fn row_to_run_item(row: &SqliteRow) -> Result<RunItem, RepositoryError> {
    let status_json: String = row.try_get("status").map_err(storage_err)?;
    let sidecar_json: String = row.try_get("sidecar").map_err(storage_err)?;

    Ok(RunItem {
        id: row.try_get("id").map_err(storage_err)?,
        run_id: row.try_get("run_id").map_err(storage_err)?,
        input_text: row.try_get("input_text").map_err(storage_err)?,
        vendor_label: row.try_get("vendor_label").map_err(storage_err)?,
        status: serde_json::from_str::<RunItemStatus>(&status_json).map_err(serde_err)?,
        audio_artifact_id: row
            .try_get("audio_artifact_id")
            .map_err(storage_err)?,
        transcript_artifact_id: row
            .try_get("transcript_artifact_id")
            .map_err(storage_err)?,
        sidecar: serde_json::from_str::<RunItemSidecar>(&sidecar_json).map_err(serde_err)?,
        failure_reason: row.try_get("failure_reason").map_err(storage_err)?,
    })
}

pub fn row_to_stored_metric(row: &SqliteRow) -> Result<StoredMetric, RepositoryError> {
    let name_str: String = row.try_get("name").map_err(storage_err)?;
    let unit_json: String = row.try_get("unit").map_err(storage_err)?;
    let name = speechbench_core::domain::MetricName::parse(&name_str)
        .ok_or_else(|| RepositoryError::Serialization(format!("unknown metric name: {name_str}")))?;

    Ok(StoredMetric {
        run_item_id: row.try_get("run_item_id").map_err(storage_err)?,
        metric: Metric {
            name,
            value: row.try_get("value").map_err(storage_err)?,
            unit: serde_json::from_str::<MetricUnit>(&unit_json).map_err(serde_err)?,
        },
    })
}

pub fn row_to_artifact(row: &SqliteRow) -> Result<Artifact, RepositoryError> {
    let kind_json: String = row.try_get("kind").map_err(storage_err)?;

    Ok(Artifact {
        id: row.try_get("id").map_err(storage_err)?,
        run_item_id: row.try_get("run_item_id").map_err(storage_err)?,
        kind: serde_json::from_str::<ArtifactKind>(&kind_json).map_err(serde_err)?,
        content_type: row.try_get("content_type").map_err(storage_err)?,
        locator: row.try_get("locator").map_err(storage_err)?,
        byte_len: row.try_get::<i64, _>("byte_len").map_err(storage_err)? as u64,
    })
}

pub fn row_to_script_item(row: &SqliteRow) -> Result<ScriptItem, RepositoryError> {
    Ok(ScriptItem {
        id: row.try_get("id").map_err(storage_err)?,
        script_id: row.try_get("script_id").map_err(storage_err)?,
        position: row.try_get("position").map_err(storage_err)?,
        text: row.try_get("text").map_err(storage_err)?,
    })
}

fn parse_timestamp(raw: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Serialization(format!("bad timestamp {raw}: {e}")))
}
