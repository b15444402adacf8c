//! Filesystem-backed `ArtifactStore` implementation.
//!
//! Audio bytes live under `{root}/audio/`, transcripts under
//! `{root}/transcripts/`, named by the Run API's filename contract
//! (`artifact_filename`). The repository tracks the resulting locator; this
//! store only ever reads/writes the bytes behind it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use speechbench_core::RepositoryError;
use speechbench_core::domain::{ArtifactKind, artifact_filename};
use speechbench_core::ports::ArtifactStore;

pub struct FilesystemArtifactStore {
    root: PathBuf,
}

impl FilesystemArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn subdir(&self, kind: ArtifactKind) -> PathBuf {
        match kind {
            ArtifactKind::Audio => self.root.join("audio"),
            ArtifactKind::Transcript => self.root.join("transcripts"),
        }
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn put(
        &self,
        kind: ArtifactKind,
        item_id: uuid::Uuid,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, RepositoryError> {
        let dir = self.subdir(kind);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        let filename = artifact_filename(kind, item_id, content_type);
        let path = dir.join(&filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| RepositoryError::Storage(e.to_string()))?;

        Ok(path
            .strip_prefix(&self.root)
            .unwrap_or(&path)
            .to_string_lossy()
            .into_owned())
    }

    async fn get(&self, locator: &str) -> Result<Vec<u8>, RepositoryError> {
        let path = self.resolve(locator);
        tokio::fs::read(&path)
            .await
            .map_err(|e| RepositoryError::NotFound(format!("artifact at {locator}: {e}")))
    }
}

impl FilesystemArtifactStore {
    fn resolve(&self, locator: &str) -> PathBuf {
        let candidate = Path::new(locator);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        }
    }
}
