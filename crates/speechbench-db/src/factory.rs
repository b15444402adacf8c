//! Composition utilities for wiring `SQLite`-backed ports together.
//!
//! Construction only — no domain logic lives here.

use sqlx::SqlitePool;
use std::sync::Arc;

use speechbench_core::ports::{ArtifactStore, Repository, ScriptRepository};

use crate::artifacts::FilesystemArtifactStore;
use crate::repositories::{SqliteRepository, SqliteScriptRepository};

pub struct DbFactory;

impl DbFactory {
    pub async fn create_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect(db_url).await?;
        Ok(pool)
    }

    pub async fn create_test_pool() -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        Ok(pool)
    }

    pub fn repository(pool: SqlitePool) -> Arc<dyn Repository> {
        Arc::new(SqliteRepository::new(pool))
    }

    pub fn script_repository(pool: SqlitePool) -> Arc<dyn ScriptRepository> {
        Arc::new(SqliteScriptRepository::new(pool))
    }

    pub fn artifact_store(root: impl Into<std::path::PathBuf>) -> Arc<dyn ArtifactStore> {
        Arc::new(FilesystemArtifactStore::new(root))
    }
}

/// In-memory test database helper, matching production schema.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    pub async fn new() -> anyhow::Result<Self> {
        let pool = crate::setup::setup_test_database().await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    #[must_use]
    pub fn repository(&self) -> SqliteRepository {
        SqliteRepository::new(self.pool.clone())
    }

    #[must_use]
    pub fn script_repository(&self) -> SqliteScriptRepository {
        SqliteScriptRepository::new(self.pool.clone())
    }
}
