//! RunItem domain types — a single (input, vendor-assignment) attempt.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::artifact::ArtifactId;
use super::metric::Metric;
use super::run::RunId;
use crate::error::CoreError;

/// Identifier for a [`RunItem`].
pub type RunItemId = Uuid;

/// Per-item status. Mirrors [`super::run::RunStatus`] but has no `Partial`
/// variant: a single item either completes or fails outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunItemStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunItemStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Validate and perform a status transition, rejecting anything outside
    /// `Pending -> Running -> {Completed, Failed}`.
    pub fn advance(self, next: Self) -> Result<Self, CoreError> {
        let legal = matches!(
            (self, next),
            (Self::Pending, Self::Running) | (Self::Running, Self::Completed | Self::Failed)
        );
        if legal {
            Ok(next)
        } else {
            Err(CoreError::Internal(format!("illegal run item status transition: {self:?} -> {next:?}")))
        }
    }
}

/// Free-form sidecar attached to a run item: service type, model ids, voice,
/// language, and the estimation/anomaly flags that must never be silently
/// dropped (per the audio-duration and RTF invariants).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunItemSidecar {
    pub service_type: Option<String>,
    pub models: std::collections::HashMap<String, String>,
    pub voice_id: Option<String>,
    pub language: Option<String>,
    /// Set when `audio_duration` was computed via the size-based fallback
    /// rather than a vendor-reported or container-parsed value.
    #[serde(default)]
    pub duration_estimated: bool,
    /// Set when RTF fell outside the `[0.01, 100]` sanity band.
    #[serde(default)]
    pub rtf_anomaly: bool,
}

/// A single (input, vendor-assignment) attempt within a [`super::run::Run`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunItem {
    pub id: RunItemId,
    pub run_id: RunId,
    pub input_text: String,
    /// Exactly one vendor token for isolated items, or `"a->b"` for chained.
    pub vendor_label: String,
    pub status: RunItemStatus,
    pub audio_artifact_id: Option<ArtifactId>,
    pub transcript_artifact_id: Option<ArtifactId>,
    pub sidecar: RunItemSidecar,
    pub failure_reason: Option<String>,
}

impl RunItem {
    /// Compact `name:value` pipe-separated summary for UI convenience.
    ///
    /// The authoritative store remains the `Metric` rows; this is purely a
    /// rendering helper for the Run API's `metrics_summary` field.
    #[must_use]
    pub fn metrics_summary(metrics: &[Metric]) -> String {
        metrics
            .iter()
            .map(|m| format!("{}:{:.4}", m.name.as_str(), m.value))
            .collect::<Vec<_>>()
            .join("|")
    }
}

/// A new, not-yet-persisted run item produced by expanding a run's inputs.
#[derive(Debug, Clone)]
pub struct NewRunItem {
    pub run_id: RunId,
    pub input_text: String,
    pub vendor_label: String,
    pub sidecar: RunItemSidecar,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metric::{Metric, MetricName};

    #[test]
    fn metrics_summary_format() {
        let metrics = vec![
            Metric::new(MetricName::TtsLatency, 0.5123),
            Metric::new(MetricName::Wer, 0.0),
        ];
        let summary = RunItem::metrics_summary(&metrics);
        assert_eq!(summary, "tts_latency:0.5123|wer:0.0000");
    }

    #[test]
    fn legal_transitions_are_accepted() {
        assert_eq!(
            RunItemStatus::Pending.advance(RunItemStatus::Running).unwrap(),
            RunItemStatus::Running
        );
        assert_eq!(
            RunItemStatus::Running.advance(RunItemStatus::Completed).unwrap(),
            RunItemStatus::Completed
        );
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        assert!(RunItemStatus::Pending.advance(RunItemStatus::Completed).is_err());
        assert!(RunItemStatus::Completed.advance(RunItemStatus::Running).is_err());
    }
}
