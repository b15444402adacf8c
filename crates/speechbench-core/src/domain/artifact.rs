//! Artifact domain types — generated audio and transcript blobs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::run_item::RunItemId;

/// Identifier for an [`Artifact`].
pub type ArtifactId = Uuid;

/// Whether an artifact is synthesized audio or transcribed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Audio,
    Transcript,
}

/// A binary or text blob tied to a run item.
///
/// Written once before the owning run item is marked completed, read-only
/// thereafter, purged with its run item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub run_item_id: RunItemId,
    pub kind: ArtifactKind,
    pub content_type: String,
    /// Opaque storage locator understood by the `ArtifactStore` that wrote
    /// it; e.g. a relative filesystem path under `storage/`.
    pub locator: String,
    pub byte_len: u64,
}

/// The canonical filename for an artifact, per the Run API contract:
/// `audio_{item_id}.{ext}` / `transcript_{item_id}.txt`.
#[must_use]
pub fn artifact_filename(kind: ArtifactKind, item_id: RunItemId, content_type: &str) -> String {
    match kind {
        ArtifactKind::Audio => {
            let ext = match content_type {
                "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
                _ => "mp3",
            };
            format!("audio_{item_id}.{ext}")
        }
        ArtifactKind::Transcript => format!("transcript_{item_id}.txt"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_match_naming_contract() {
        let id = Uuid::nil();
        assert_eq!(
            artifact_filename(ArtifactKind::Audio, id, "audio/wav"),
            format!("audio_{id}.wav")
        );
        assert_eq!(
            artifact_filename(ArtifactKind::Audio, id, "audio/mpeg"),
            format!("audio_{id}.mp3")
        );
        assert_eq!(
            artifact_filename(ArtifactKind::Transcript, id, "text/plain"),
            format!("transcript_{id}.txt")
        );
    }
}
