//! Repository port (§5, §7).
//!
//! Persists runs, run items, metrics, and the artifact index. Implemented
//! by `speechbench-db` against SQLite; mocked in engine/axum tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Artifact, ArtifactId, Metric, MetricName, NewRun, NewRunItem, Run, RunId, RunItem, RunItemId,
    RunItemSidecar, RunItemStatus, RunStatus, StoredMetric,
};
use crate::error::RepositoryError;

/// A bounded time window used by aggregation queries (§6).
#[derive(Debug, Clone, Copy)]
pub struct TimeWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

/// Persistence port for runs, run items, metrics, and artifacts.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn create_run(&self, new_run: NewRun) -> Result<Run, RepositoryError>;

    async fn append_items(&self, items: Vec<NewRunItem>) -> Result<Vec<RunItem>, RepositoryError>;

    async fn set_run_status(
        &self,
        run_id: RunId,
        status: RunStatus,
        finished_at: Option<DateTime<Utc>>,
    ) -> Result<(), RepositoryError>;

    async fn set_item_status(
        &self,
        item_id: RunItemId,
        status: RunItemStatus,
        failure_reason: Option<String>,
    ) -> Result<(), RepositoryError>;

    /// Overwrite a run item's sidecar, used by the engine once the
    /// duration-estimation and RTF-anomaly flags are known (they are not
    /// available yet when the item is first persisted).
    async fn update_item_sidecar(
        &self,
        item_id: RunItemId,
        sidecar: RunItemSidecar,
    ) -> Result<(), RepositoryError>;

    async fn record_metric(&self, metric: StoredMetric) -> Result<(), RepositoryError>;

    async fn record_artifact(&self, artifact: Artifact) -> Result<(), RepositoryError>;

    async fn get_run(&self, run_id: RunId) -> Result<Run, RepositoryError>;

    async fn list_runs(&self, window: Option<TimeWindow>) -> Result<Vec<Run>, RepositoryError>;

    async fn get_item(&self, item_id: RunItemId) -> Result<RunItem, RepositoryError>;

    async fn list_items_by_run(&self, run_id: RunId) -> Result<Vec<RunItem>, RepositoryError>;

    async fn list_metrics_by_run(&self, run_id: RunId) -> Result<Vec<StoredMetric>, RepositoryError>;

    async fn get_artifact(&self, artifact_id: ArtifactId) -> Result<Artifact, RepositoryError>;

    /// Raw values for a single metric across every run item whose parent run
    /// falls inside `window`, for percentile/count aggregation (§4.7, §6).
    async fn metric_values_in_window(
        &self,
        name: MetricName,
        window: TimeWindow,
    ) -> Result<Vec<f64>, RepositoryError>;
}
