//! Artifact store port (§5).
//!
//! Separate from `Repository`: artifact bytes are large binary payloads
//! that belong on disk (or object storage), while the `Artifact` index row
//! (id, locator, content type, byte length) lives in the repository.

use async_trait::async_trait;

use crate::domain::ArtifactKind;
use crate::error::RepositoryError;

/// Stores and retrieves artifact bytes by a vendor-opaque locator string.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist `bytes` under a locator derived from `kind`/`item_id`/`content_type`
    /// and return that locator for indexing in the repository.
    async fn put(
        &self,
        kind: ArtifactKind,
        item_id: uuid::Uuid,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<String, RepositoryError>;

    async fn get(&self, locator: &str) -> Result<Vec<u8>, RepositoryError>;
}
