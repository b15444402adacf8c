//! Run domain types.
//!
//! These types represent a benchmark run, independent of any infrastructure
//! concerns (database, HTTP transport, etc.).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Identifier for a [`Run`].
pub type RunId = Uuid;

/// Execution mode for a run.
///
/// Isolated mode measures a single capability (TTS or STT) with the other
/// side held fixed. Chained mode measures a full TTS->STT pipeline with a
/// user-selected vendor pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Isolated,
    Chained,
}

/// Which capability an isolated run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Tts,
    Stt,
}

/// Run-level status. Transitions are monotone:
/// `Pending -> Running -> {Completed | Failed | Partial}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Partial,
}

impl RunStatus {
    /// Whether this status is terminal (no further transitions allowed).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Partial)
    }

    /// Validate and perform a status transition, rejecting anything outside
    /// `Pending -> Running -> {Completed, Failed, Partial}`. This is the
    /// single place that enforces "transitions are monotone" rather than
    /// trusting every call site to set the field directly.
    pub fn advance(self, next: Self) -> Result<Self, CoreError> {
        let legal = matches!(
            (self, next),
            (Self::Pending, Self::Running)
                | (Self::Running, Self::Completed | Self::Failed | Self::Partial)
        );
        if legal {
            Ok(next)
        } else {
            Err(CoreError::Internal(format!("illegal run status transition: {self:?} -> {next:?}")))
        }
    }
}

/// Chain pairing for chained-mode runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainPairing {
    pub tts_vendor: String,
    pub stt_vendor: String,
}

/// Configuration snapshot captured at run creation time.
///
/// This is the free-form part of a run: per-vendor model ids, voice id,
/// language, and (for chained runs) the vendor pairing. It is persisted
/// verbatim as a JSON sidecar and never mutated after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Required for isolated runs: which capability is under test.
    pub service: Option<ServiceType>,
    /// Required for chained runs: the TTS->STT vendor pairing.
    pub chain: Option<ChainPairing>,
    /// Per-vendor model identifiers (vendor id -> model id).
    #[serde(default)]
    pub models: std::collections::HashMap<String, String>,
    pub voice_id: Option<String>,
    pub language: Option<String>,
}

/// A user-initiated benchmark execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub created_at: DateTime<Utc>,
    pub mode: RunMode,
    pub vendors: Vec<String>,
    pub config: RunConfig,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Fields required to create a new run, before it has been persisted.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub mode: RunMode,
    pub vendors: Vec<String>,
    pub config: RunConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!RunStatus::Pending.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Partial.is_terminal());
    }

    #[test]
    fn legal_transitions_are_accepted() {
        assert_eq!(RunStatus::Pending.advance(RunStatus::Running).unwrap(), RunStatus::Running);
        assert_eq!(RunStatus::Running.advance(RunStatus::Completed).unwrap(), RunStatus::Completed);
        assert_eq!(RunStatus::Running.advance(RunStatus::Partial).unwrap(), RunStatus::Partial);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        assert!(RunStatus::Pending.advance(RunStatus::Completed).is_err());
        assert!(RunStatus::Completed.advance(RunStatus::Running).is_err());
        assert!(RunStatus::Failed.advance(RunStatus::Completed).is_err());
    }
}
