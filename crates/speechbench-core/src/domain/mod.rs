//! Domain types.
//!
//! These types represent the benchmark execution model, independent of any
//! infrastructure concerns (database, HTTP transport, vendor wire formats).

pub mod artifact;
pub mod metric;
pub mod run;
pub mod run_item;
pub mod script;

pub use artifact::{Artifact, ArtifactId, ArtifactKind, artifact_filename};
pub use metric::{Metric, MetricName, MetricUnit, StoredMetric};
pub use run::{ChainPairing, NewRun, Run, RunConfig, RunId, RunMode, RunStatus, ServiceType};
pub use run_item::{NewRunItem, RunItem, RunItemId, RunItemSidecar, RunItemStatus};
pub use script::{Script, ScriptId, ScriptItem};
