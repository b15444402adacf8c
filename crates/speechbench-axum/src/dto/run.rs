//! Request/response DTOs for the Run API (§6's `CreateRun`/`GetRun`/`ListRuns`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use speechbench_core::domain::{
    Artifact, ChainPairing, Run, RunConfig, RunId, RunItem, RunItemStatus, RunMode, RunStatus,
    ServiceType, StoredMetric,
};

/// How `CreateRun`'s input texts were supplied (§6: "direct text OR script
/// ids OR pasted batch in {txt|jsonl|csv}").
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum InputSource {
    /// Input texts given directly in the request body.
    Direct { texts: Vec<String> },
    /// Reuse a previously-created script's ordered input texts.
    Script { script_id: Uuid },
    /// A pasted batch file in one of the recognized formats.
    Batch {
        format: BatchFormat,
        content: String,
    },
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchFormat {
    Txt,
    Jsonl,
    Csv,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainPairingDto {
    pub tts_vendor: String,
    pub stt_vendor: String,
}

impl From<ChainPairingDto> for ChainPairing {
    fn from(dto: ChainPairingDto) -> Self {
        Self {
            tts_vendor: dto.tts_vendor,
            stt_vendor: dto.stt_vendor,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRunRequest {
    pub mode: RunMode,
    pub vendors: Vec<String>,
    pub service: Option<ServiceType>,
    pub chain: Option<ChainPairingDto>,
    #[serde(default)]
    pub models: HashMap<String, String>,
    pub voice_id: Option<String>,
    pub language: Option<String>,
    pub input_source: InputSource,
}

impl CreateRunRequest {
    #[must_use]
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            service: self.service,
            chain: self.chain.clone().map(Into::into),
            models: self.models.clone(),
            voice_id: self.voice_id.clone(),
            language: self.language.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRunResponse {
    pub run_id: RunId,
    pub accepted_items_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RunItemDto {
    pub id: Uuid,
    pub vendor_label: String,
    pub status: RunItemStatus,
    pub input_text: String,
    pub transcript: Option<String>,
    pub audio_path: Option<String>,
    pub transcript_path: Option<String>,
    pub metrics_summary: String,
    pub sidecar: serde_json::Value,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunDto {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub mode: RunMode,
    pub vendors: Vec<String>,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub items: Vec<RunItemDto>,
}

/// Build a [`RunItemDto`], deriving `audio_path`/`transcript_path` from the
/// stored [`Artifact`] rows and `transcript` directly from the transcript
/// artifact's bytes when present.
#[must_use]
pub fn build_run_item_dto(
    item: &RunItem,
    metrics: &[StoredMetric],
    audio_artifact: Option<&Artifact>,
    transcript_artifact: Option<(&Artifact, &str)>,
) -> RunItemDto {
    let item_metrics: Vec<_> = metrics
        .iter()
        .filter(|m| m.run_item_id == item.id)
        .map(|m| m.metric.clone())
        .collect();

    RunItemDto {
        id: item.id,
        vendor_label: item.vendor_label.clone(),
        status: item.status,
        input_text: item.input_text.clone(),
        transcript: transcript_artifact.map(|(_, text)| text.to_string()),
        audio_path: audio_artifact.map(|a| a.locator.clone()),
        transcript_path: transcript_artifact.map(|(a, _)| a.locator.clone()),
        metrics_summary: speechbench_core::domain::RunItem::metrics_summary(&item_metrics),
        sidecar: serde_json::to_value(&item.sidecar).unwrap_or(serde_json::Value::Null),
        failure_reason: item.failure_reason.clone(),
    }
}

#[must_use]
pub fn build_run_dto(run: &Run, items: Vec<RunItemDto>) -> RunDto {
    RunDto {
        id: run.id,
        created_at: run.created_at,
        mode: run.mode,
        vendors: run.vendors.clone(),
        status: run.status,
        started_at: run.started_at,
        finished_at: run.finished_at,
        items,
    }
}
