//! `SQLite` implementation of the `Repository` port.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use speechbench_core::RepositoryError;
use speechbench_core::domain::{
    Artifact, ArtifactId, MetricName, NewRun, NewRunItem, Run, RunId, RunItem, RunItemId,
    RunItemSidecar, RunItemStatus, RunStatus, StoredMetric,
};
use speechbench_core::ports::{Repository, TimeWindow};

use super::row_mappers::{
    ARTIFACT_SELECT_COLUMNS, RUN_ITEM_SELECT_COLUMNS, RUN_SELECT_COLUMNS, row_to_artifact,
    row_to_run, row_to_run_item, row_to_stored_metric,
};

fn storage_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Storage(e.to_string())
}

fn serde_err(e: impl std::fmt::Display) -> RepositoryError {
    RepositoryError::Serialization(e.to_string())
}

/// `SQLite` implementation of the `Repository` trait.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_run(&self, new_run: NewRun) -> Result<Run, RepositoryError> {
        let run = Run {
            id: uuid::Uuid::new_v4(),
            created_at: Utc::now(),
            mode: new_run.mode,
            vendors: new_run.vendors,
            config: new_run.config,
            status: RunStatus::Pending,
            started_at: None,
            finished_at: None,
        };

        let mode_json = serde_json::to_string(&run.mode).map_err(serde_err)?;
        let vendors_json = serde_json::to_string(&run.vendors).map_err(serde_err)?;
        let config_json = serde_json::to_string(&run.config).map_err(serde_err)?;
        let status_json = serde_json::to_string(&run.status).map_err(serde_err)?;

        sqlx::query(
            r#"
            INSERT INTO runs (id, created_at, mode, vendors, config, status, started_at, finished_at)
            VALUES (?, ?, ?, ?, ?, ?, NULL, NULL)
            "#,
        )
        .bind(run.id)
        .bind(run.created_at.to_rfc3339())
        .bind(&mode_json)
        .bind(&vendors_json)
        .bind(&config_json)
        .bind(&status_json)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(run)
    }

    async fn append_items(&self, items: Vec<NewRunItem>) -> Result<Vec<RunItem>, RepositoryError> {
        let mut created = Vec::with_capacity(items.len());
        for new_item in items {
            let item = RunItem {
                id: uuid::Uuid::new_v4(),
                run_id: new_item.run_id,
                input_text: new_item.input_text,
                vendor_label: new_item.vendor_label,
                status: RunItemStatus::Pending,
                audio_artifact_id: None,
                transcript_artifact_id: None,
                sidecar: new_item.sidecar,
                failure_reason: None,
            };

            let status_json = serde_json::to_string(&item.status).map_err(serde_err)?;
            let sidecar_json = serde_json::to_string(&item.sidecar).map_err(serde_err)?;

            sqlx::query(
                r#"
                INSERT INTO run_items (id, run_id, input_text, vendor_label, status, audio_artifact_id, transcript_artifact_id, sidecar, failure_reason)
                VALUES (?, ?, ?, ?, ?, NULL, NULL, ?, NULL)
                "#,
            )
            .bind(item.id)
            .bind(item.run_id)
            .bind(&item.input_text)
            .bind(&item.vendor_label)
            .bind(&status_json)
            .bind(&sidecar_json)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

            created.push(item);
        }
        Ok(created)
    }

    async fn set_run_status(
        &self,
        run_id: RunId,
        status: RunStatus,
        finished_at: Option<chrono::DateTime<Utc>>,
    ) -> Result<(), RepositoryError> {
        let status_json = serde_json::to_string(&status).map_err(serde_err)?;

        let result = if status == RunStatus::Running {
            sqlx::query("UPDATE runs SET status = ?, started_at = ? WHERE id = ?")
                .bind(&status_json)
                .bind(Utc::now().to_rfc3339())
                .bind(run_id)
                .execute(&self.pool)
                .await
        } else {
            sqlx::query("UPDATE runs SET status = ?, finished_at = ? WHERE id = ?")
                .bind(&status_json)
                .bind(finished_at.map(|dt| dt.to_rfc3339()))
                .bind(run_id)
                .execute(&self.pool)
                .await
        }
        .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("run {run_id}")));
        }
        Ok(())
    }

    async fn set_item_status(
        &self,
        item_id: RunItemId,
        status: RunItemStatus,
        failure_reason: Option<String>,
    ) -> Result<(), RepositoryError> {
        let status_json = serde_json::to_string(&status).map_err(serde_err)?;

        let result = sqlx::query("UPDATE run_items SET status = ?, failure_reason = ? WHERE id = ?")
            .bind(&status_json)
            .bind(&failure_reason)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("run item {item_id}")));
        }
        Ok(())
    }

    async fn update_item_sidecar(
        &self,
        item_id: RunItemId,
        sidecar: RunItemSidecar,
    ) -> Result<(), RepositoryError> {
        let sidecar_json = serde_json::to_string(&sidecar).map_err(serde_err)?;

        let result = sqlx::query("UPDATE run_items SET sidecar = ? WHERE id = ?")
            .bind(&sidecar_json)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("run item {item_id}")));
        }
        Ok(())
    }

    async fn record_metric(&self, metric: StoredMetric) -> Result<(), RepositoryError> {
        let unit_json = serde_json::to_string(&metric.metric.unit).map_err(serde_err)?;

        sqlx::query(
            r#"
            INSERT INTO metrics (run_item_id, name, value, unit)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(run_item_id, name) DO UPDATE SET value = excluded.value, unit = excluded.unit
            "#,
        )
        .bind(metric.run_item_id)
        .bind(metric.metric.name.as_str())
        .bind(metric.metric.value)
        .bind(&unit_json)
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn record_artifact(&self, artifact: Artifact) -> Result<(), RepositoryError> {
        let kind_json = serde_json::to_string(&artifact.kind).map_err(serde_err)?;

        // The artifact row and the run-item pointer column must land together:
        // a reader must never observe an artifact with no owning run item, or a
        // run item pointing at a row that doesn't exist yet.
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        sqlx::query(
            r#"
            INSERT INTO artifacts (id, run_item_id, kind, content_type, locator, byte_len)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(artifact.id)
        .bind(artifact.run_item_id)
        .bind(&kind_json)
        .bind(&artifact.content_type)
        .bind(&artifact.locator)
        .bind(artifact.byte_len as i64)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;

        let column = match artifact.kind {
            speechbench_core::domain::ArtifactKind::Audio => "audio_artifact_id",
            speechbench_core::domain::ArtifactKind::Transcript => "transcript_artifact_id",
        };
        let query = format!("UPDATE run_items SET {column} = ? WHERE id = ?");
        sqlx::query(&query)
            .bind(artifact.id)
            .bind(artifact.run_item_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;
        Ok(())
    }

    async fn get_run(&self, run_id: RunId) -> Result<Run, RepositoryError> {
        let query = format!("SELECT {RUN_SELECT_COLUMNS} FROM runs WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(run_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| RepositoryError::NotFound(format!("run {run_id}")))?;
        row_to_run(&row)
    }

    async fn list_runs(&self, window: Option<TimeWindow>) -> Result<Vec<Run>, RepositoryError> {
        let rows = if let Some(w) = window {
            let query = format!(
                "SELECT {RUN_SELECT_COLUMNS} FROM runs WHERE created_at >= ? AND created_at <= ? ORDER BY created_at DESC"
            );
            sqlx::query(&query)
                .bind(w.since.to_rfc3339())
                .bind(w.until.to_rfc3339())
                .fetch_all(&self.pool)
                .await
        } else {
            let query = format!("SELECT {RUN_SELECT_COLUMNS} FROM runs ORDER BY created_at DESC");
            sqlx::query(&query).fetch_all(&self.pool).await
        }
        .map_err(storage_err)?;

        rows.iter().map(row_to_run).collect()
    }

    async fn get_item(&self, item_id: RunItemId) -> Result<RunItem, RepositoryError> {
        let query = format!("SELECT {RUN_ITEM_SELECT_COLUMNS} FROM run_items WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| RepositoryError::NotFound(format!("run item {item_id}")))?;
        row_to_run_item(&row)
    }

    async fn list_items_by_run(&self, run_id: RunId) -> Result<Vec<RunItem>, RepositoryError> {
        let query =
            format!("SELECT {RUN_ITEM_SELECT_COLUMNS} FROM run_items WHERE run_id = ? ORDER BY rowid");
        let rows = sqlx::query(&query)
            .bind(run_id)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        rows.iter().map(row_to_run_item).collect()
    }

    async fn list_metrics_by_run(&self, run_id: RunId) -> Result<Vec<StoredMetric>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT m.run_item_id, m.name, m.value, m.unit FROM metrics m \
             JOIN run_items ri ON ri.id = m.run_item_id WHERE ri.run_id = ?",
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows.iter().map(row_to_stored_metric).collect()
    }

    async fn get_artifact(&self, artifact_id: ArtifactId) -> Result<Artifact, RepositoryError> {
        let query = format!("SELECT {ARTIFACT_SELECT_COLUMNS} FROM artifacts WHERE id = ?");
        let row = sqlx::query(&query)
            .bind(artifact_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| RepositoryError::NotFound(format!("artifact {artifact_id}")))?;
        row_to_artifact(&row)
    }

    async fn metric_values_in_window(
        &self,
        name: MetricName,
        window: TimeWindow,
    ) -> Result<Vec<f64>, RepositoryError> {
        let rows: Vec<(f64,)> = sqlx::query_as(
            "SELECT m.value FROM metrics m \
             JOIN run_items ri ON ri.id = m.run_item_id \
             JOIN runs r ON r.id = ri.run_id \
             WHERE m.name = ? AND r.created_at >= ? AND r.created_at <= ?",
        )
        .bind(name.as_str())
        .bind(window.since.to_rfc3339())
        .bind(window.until.to_rfc3339())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows.into_iter().map(|(v,)| v).collect())
    }
}
