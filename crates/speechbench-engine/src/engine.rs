//! Run orchestration (§4.5): expands a run into run items, dispatches each
//! to its adapter(s) under bounded concurrency, records metrics and
//! artifacts, and advances the run/run-item state machines.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use speechbench_core::domain::{
    Artifact, ArtifactKind, Metric, MetricName, NewRun, NewRunItem, RunConfig, RunId, RunItem,
    RunItemSidecar, RunItemStatus, RunMode, RunStatus, ServiceType, StoredMetric,
};
use speechbench_core::error::{CoreError, VendorError};
use speechbench_core::metrics::{accuracy_from_wer, normalize_confidence, real_time_factor, word_error_rate};
use speechbench_core::ports::{
    ArtifactStore, Repository, SttAdapter, SynthesizeConfig, TranscribeConfig, TtsAdapter,
};
use speechbench_core::timing::Stopwatch;
use speechbench_vendors::VendorRegistry;

use crate::config::EngineConfig;
use crate::duration::probe_duration;

/// Holds every dependency the engine needs to expand, dispatch, and record
/// a run, generalizing the teacher's "process-wide singletons passed as
/// explicit dependencies" pattern (REDESIGN FLAGS §9).
#[derive(Clone)]
pub struct Engine {
    repository: Arc<dyn Repository>,
    artifact_store: Arc<dyn ArtifactStore>,
    registry: Arc<VendorRegistry>,
    config: EngineConfig,
}

impl Engine {
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository>,
        artifact_store: Arc<dyn ArtifactStore>,
        registry: Arc<VendorRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            artifact_store,
            registry,
            config,
        }
    }

    /// Validate, persist, and expand a new run (§4.5's `CreateRun`).
    ///
    /// Returns as soon as the run and its items are durably recorded;
    /// `execute_run` is spawned as a detached background task, matching the
    /// "Returns identifier immediately; actual work proceeds asynchronously"
    /// contract.
    pub async fn create_run(
        &self,
        mode: RunMode,
        vendors: Vec<String>,
        inputs: Vec<String>,
        config: RunConfig,
    ) -> Result<RunId, CoreError> {
        validate_create_run(mode, &vendors, &inputs, &config, &self.registry)?;

        let new_items_input = inputs.clone();
        let run = self
            .repository
            .create_run(NewRun {
                mode,
                vendors: vendors.clone(),
                config: config.clone(),
            })
            .await?;

        let new_items = expand_items(run.id, mode, &vendors, &new_items_input, &config);
        self.repository.append_items(new_items).await?;

        let engine = self.clone();
        let run_id = run.id;
        tokio::spawn(async move {
            if let Err(err) = engine.execute_run(run_id, CancellationToken::new()).await {
                error!(target: "speechbench.engine", %run_id, error = %err, "run execution failed");
            }
        });

        Ok(run.id)
    }

    /// Drive a run to completion: one bounded-concurrency task per run item,
    /// then a terminal status computed from the collected per-item outcomes.
    ///
    /// `cancel` is advisory (§5): checked between item dispatches only,
    /// in-flight items always run to completion.
    pub async fn execute_run(&self, run_id: RunId, cancel: CancellationToken) -> Result<(), CoreError> {
        let run = self.repository.get_run(run_id).await?;
        run.status.advance(RunStatus::Running)?;
        self.repository
            .set_run_status(run_id, RunStatus::Running, None)
            .await?;

        let items = self.repository.list_items_by_run(run_id).await?;
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut handles = Vec::with_capacity(items.len());

        for item in items {
            if cancel.is_cancelled() {
                info!(target: "speechbench.engine", %run_id, "run cancellation observed; not starting further items");
                break;
            }
            let semaphore = Arc::clone(&semaphore);
            let engine = self.clone();
            handles.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                engine.execute_item(item).await
            }));
        }

        let mut completed = 0usize;
        let mut failed = 0usize;
        for handle in handles {
            match handle.await {
                Ok(RunItemStatus::Completed) => completed += 1,
                Ok(_) => failed += 1,
                Err(join_err) => {
                    warn!(target: "speechbench.engine", %run_id, error = %join_err, "run item task panicked");
                    failed += 1;
                }
            }
        }

        let status = match (completed, failed) {
            (_, 0) => RunStatus::Completed,
            (0, _) => RunStatus::Failed,
            _ => RunStatus::Partial,
        };
        RunStatus::Running.advance(status)?;
        self.repository
            .set_run_status(run_id, status, Some(Utc::now()))
            .await?;
        Ok(())
    }

    /// Run a single item through its protocol (isolated TTS / isolated STT /
    /// chained) and persist its terminal status. Adapter/vendor failures are
    /// captured here and never propagated — per §7, a per-item error never
    /// aborts the run.
    async fn execute_item(&self, item: RunItem) -> RunItemStatus {
        if let Err(err) = item.status.advance(RunItemStatus::Running) {
            error!(target: "speechbench.engine", item_id = %item.id, error = %err, "refusing illegal item transition");
            return RunItemStatus::Failed;
        }
        if let Err(err) = self
            .repository
            .set_item_status(item.id, RunItemStatus::Running, None)
            .await
        {
            error!(target: "speechbench.engine", item_id = %item.id, error = %err, "failed to mark item running");
            return RunItemStatus::Failed;
        }

        let outcome = match item.sidecar.service_type.as_deref() {
            Some("tts") => self.run_isolated_tts(&item).await,
            Some("stt") => self.run_isolated_stt(&item).await,
            Some("chained") => self.run_chained(&item).await,
            other => Err(VendorError::CallFailed {
                message: format!("run item has no recognized service_type: {other:?}"),
                retryable: false,
                status: None,
            }),
        };

        let final_status = match &outcome {
            Ok(()) => RunItemStatus::Completed,
            Err(_) => RunItemStatus::Failed,
        };
        let failure_reason = outcome.err().map(|e| e.failure_reason());

        if let Err(err) = RunItemStatus::Running.advance(final_status) {
            error!(target: "speechbench.engine", item_id = %item.id, error = %err, "refusing illegal item transition");
            return RunItemStatus::Failed;
        }
        if let Err(err) = self
            .repository
            .set_item_status(item.id, final_status, failure_reason)
            .await
        {
            error!(target: "speechbench.engine", item_id = %item.id, error = %err, "failed to record item terminal status");
        }

        final_status
    }

    async fn run_isolated_tts(&self, item: &RunItem) -> Result<(), VendorError> {
        let vendor_id = &item.vendor_label;
        let adapter = self.registry.tts(vendor_id)?;

        let (audio, content_type, tts_latency, vendor_duration, ttfb) =
            self.synthesize(adapter.as_ref(), item).await?;

        self.persist_audio_and_duration(item, &audio, &content_type, tts_latency, vendor_duration)
            .await?;
        if let Some(ttfb) = ttfb {
            self.record_metric(item.id, Metric::new(MetricName::TtsTtfb, ttfb)).await?;
        }

        let evaluator = self.registry.stt(&self.config.default_evaluator_vendor)?;
        self.evaluate_against_reference(item, &audio, &content_type, evaluator.as_ref())
            .await
    }

    async fn run_isolated_stt(&self, item: &RunItem) -> Result<(), VendorError> {
        let synthesizer = self.registry.tts(&self.config.default_synth_vendor)?;
        let (audio, content_type, _synth_latency, vendor_duration, _ttfb) =
            self.synthesize(synthesizer.as_ref(), item).await?;

        let duration = probe_duration(&audio, &content_type, vendor_duration);
        self.persist_artifact(item.id, ArtifactKind::Audio, &content_type, &audio).await?;
        self.apply_duration_sidecar(item, duration.estimated).await?;
        if let Some(seconds) = duration.seconds {
            self.record_metric(item.id, Metric::new(MetricName::AudioDuration, seconds)).await?;
        }

        let adapter = self.registry.stt(vendor_label(item))?;
        let transcribe_cfg = TranscribeConfig {
            audio: audio.clone(),
            content_type: content_type.clone(),
            model: item.sidecar.models.get(vendor_label(item)).cloned(),
            language: item.sidecar.language.clone(),
        };

        let sw = Stopwatch::start();
        let output = tokio::time::timeout(self.config.transcribe_timeout, adapter.transcribe(transcribe_cfg))
            .await
            .map_err(|_| VendorError::Timeout)??;
        let stt_latency = sw.elapsed();

        self.record_metric(item.id, Metric::new(MetricName::SttLatency, stt_latency)).await?;
        if let Some(rtf) = duration.seconds.and_then(|d| real_time_factor(stt_latency, d)) {
            self.record_metric(item.id, Metric::new(MetricName::SttRtf, rtf.value)).await?;
            if rtf.anomaly {
                self.flag_rtf_anomaly(item).await?;
            }
        }

        self.persist_artifact(item.id, ArtifactKind::Transcript, "text/plain", output.transcript.as_bytes())
            .await?;
        self.record_wer_accuracy_confidence(item.id, &item.input_text, &output.transcript, output.confidence)
            .await
    }

    async fn run_chained(&self, item: &RunItem) -> Result<(), VendorError> {
        let (tts_vendor, stt_vendor) = split_chain_label(item)?;
        let tts_adapter = self.registry.tts(&tts_vendor)?;
        let stt_adapter = self.registry.stt(&stt_vendor)?;

        let (audio, content_type, tts_latency, vendor_duration, ttfb) =
            self.synthesize(tts_adapter.as_ref(), item).await?;

        self.persist_audio_and_duration(item, &audio, &content_type, tts_latency, vendor_duration)
            .await?;
        if let Some(ttfb) = ttfb {
            self.record_metric(item.id, Metric::new(MetricName::TtsTtfb, ttfb)).await?;
        }

        let transcribe_cfg = TranscribeConfig {
            audio: audio.clone(),
            content_type: content_type.clone(),
            model: item.sidecar.models.get(&stt_vendor).cloned(),
            language: item.sidecar.language.clone(),
        };
        let sw = Stopwatch::start();
        let output = tokio::time::timeout(self.config.transcribe_timeout, stt_adapter.transcribe(transcribe_cfg))
            .await
            .map_err(|_| VendorError::Timeout)??;
        let stt_latency = sw.elapsed();

        self.record_metric(item.id, Metric::new(MetricName::SttLatency, stt_latency)).await?;
        self.record_metric(item.id, Metric::new(MetricName::E2eLatency, tts_latency + stt_latency))
            .await?;

        let duration = probe_duration(&audio, &content_type, vendor_duration);
        if let Some(rtf) = duration.seconds.and_then(|d| real_time_factor(stt_latency, d)) {
            self.record_metric(item.id, Metric::new(MetricName::SttRtf, rtf.value)).await?;
            if rtf.anomaly {
                self.flag_rtf_anomaly(item).await?;
            }
        }

        self.persist_artifact(item.id, ArtifactKind::Transcript, "text/plain", output.transcript.as_bytes())
            .await?;
        self.record_wer_accuracy_confidence(item.id, &item.input_text, &output.transcript, output.confidence)
            .await
    }

    /// Shared `Synthesize` call + timing for all three protocols. Timing
    /// excludes local file I/O: the `Stopwatch` starts immediately before
    /// the adapter call and stops immediately after it returns (§4.1, §4.2).
    async fn synthesize(
        &self,
        adapter: &(dyn TtsAdapter + Send + Sync),
        item: &RunItem,
    ) -> Result<(Vec<u8>, String, f64, Option<f64>, Option<f64>), VendorError> {
        let synth_cfg = SynthesizeConfig {
            text: item.input_text.clone(),
            voice_id: item.sidecar.voice_id.clone(),
            model: item.sidecar.models.get(adapter.vendor_id()).cloned(),
            language: item.sidecar.language.clone(),
        };

        let sw = Stopwatch::start();
        let output = tokio::time::timeout(self.config.synthesize_timeout, adapter.synthesize(synth_cfg))
            .await
            .map_err(|_| VendorError::Timeout)??;
        let latency = sw.elapsed();

        Ok((output.audio, output.content_type, latency, output.vendor_duration_secs, output.ttfb_secs))
    }

    async fn persist_audio_and_duration(
        &self,
        item: &RunItem,
        audio: &[u8],
        content_type: &str,
        tts_latency: f64,
        vendor_duration: Option<f64>,
    ) -> Result<(), VendorError> {
        self.persist_artifact(item.id, ArtifactKind::Audio, content_type, audio).await?;
        self.record_metric(item.id, Metric::new(MetricName::TtsLatency, tts_latency)).await?;

        let duration = probe_duration(audio, content_type, vendor_duration);
        self.apply_duration_sidecar(item, duration.estimated).await?;
        if let Some(seconds) = duration.seconds {
            self.record_metric(item.id, Metric::new(MetricName::AudioDuration, seconds)).await?;
            if let Some(rtf) = real_time_factor(tts_latency, seconds) {
                self.record_metric(item.id, Metric::new(MetricName::TtsRtf, rtf.value)).await?;
                if rtf.anomaly {
                    self.flag_rtf_anomaly(item).await?;
                }
            }
        }
        Ok(())
    }

    async fn evaluate_against_reference(
        &self,
        item: &RunItem,
        audio: &[u8],
        content_type: &str,
        evaluator: &(dyn SttAdapter + Send + Sync),
    ) -> Result<(), VendorError> {
        let transcribe_cfg = TranscribeConfig {
            audio: audio.to_vec(),
            content_type: content_type.to_string(),
            model: None,
            language: item.sidecar.language.clone(),
        };
        let output = tokio::time::timeout(self.config.transcribe_timeout, evaluator.transcribe(transcribe_cfg))
            .await
            .map_err(|_| VendorError::Timeout)??;

        self.persist_artifact(item.id, ArtifactKind::Transcript, "text/plain", output.transcript.as_bytes())
            .await?;
        self.record_wer_accuracy_confidence(item.id, &item.input_text, &output.transcript, output.confidence)
            .await
    }

    async fn record_wer_accuracy_confidence(
        &self,
        item_id: Uuid,
        reference: &str,
        hypothesis: &str,
        raw_confidence: Option<f64>,
    ) -> Result<(), VendorError> {
        let wer = word_error_rate(reference, hypothesis);
        let accuracy = accuracy_from_wer(wer);
        let confidence = normalize_confidence(raw_confidence);

        self.record_metric(item_id, Metric::new(MetricName::Wer, wer)).await?;
        self.record_metric(item_id, Metric::new(MetricName::Accuracy, accuracy)).await?;
        self.record_metric(item_id, Metric::new(MetricName::Confidence, confidence)).await?;
        Ok(())
    }

    async fn persist_artifact(
        &self,
        item_id: Uuid,
        kind: ArtifactKind,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<(), VendorError> {
        let locator = self
            .artifact_store
            .put(kind, item_id, content_type, bytes)
            .await
            .map_err(repo_err_to_vendor_err)?;

        self.repository
            .record_artifact(Artifact {
                id: Uuid::new_v4(),
                run_item_id: item_id,
                kind,
                content_type: content_type.to_string(),
                locator,
                byte_len: bytes.len() as u64,
            })
            .await
            .map_err(repo_err_to_vendor_err)
    }

    async fn record_metric(&self, item_id: Uuid, metric: Metric) -> Result<(), VendorError> {
        self.repository
            .record_metric(StoredMetric { run_item_id: item_id, metric })
            .await
            .map_err(repo_err_to_vendor_err)
    }

    async fn apply_duration_sidecar(&self, item: &RunItem, estimated: bool) -> Result<(), VendorError> {
        if !estimated || item.sidecar.duration_estimated {
            return Ok(());
        }
        let mut sidecar = item.sidecar.clone();
        sidecar.duration_estimated = true;
        self.repository
            .update_item_sidecar(item.id, sidecar)
            .await
            .map_err(repo_err_to_vendor_err)
    }

    async fn flag_rtf_anomaly(&self, item: &RunItem) -> Result<(), VendorError> {
        if item.sidecar.rtf_anomaly {
            return Ok(());
        }
        let mut sidecar = item.sidecar.clone();
        sidecar.rtf_anomaly = true;
        self.repository
            .update_item_sidecar(item.id, sidecar)
            .await
            .map_err(repo_err_to_vendor_err)
    }
}

fn repo_err_to_vendor_err(err: speechbench_core::RepositoryError) -> VendorError {
    VendorError::CallFailed {
        message: err.to_string(),
        retryable: false,
        status: None,
    }
}

fn vendor_label(item: &RunItem) -> &str {
    &item.vendor_label
}

fn split_chain_label(item: &RunItem) -> Result<(String, String), VendorError> {
    item.vendor_label
        .split_once("->")
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .ok_or_else(|| VendorError::CallFailed {
            message: format!("malformed chained vendor label: {}", item.vendor_label),
            retryable: false,
            status: None,
        })
}

fn validate_create_run(
    mode: RunMode,
    vendors: &[String],
    inputs: &[String],
    config: &RunConfig,
    registry: &VendorRegistry,
) -> Result<(), CoreError> {
    if vendors.is_empty() {
        return Err(CoreError::Validation("vendors must not be empty".to_string()));
    }
    if inputs.is_empty() {
        return Err(CoreError::Validation("inputs must not be empty".to_string()));
    }

    match mode {
        RunMode::Isolated => {
            let service = config
                .service
                .ok_or_else(|| CoreError::Validation("service is required in isolated mode".to_string()))?;
            for vendor in vendors {
                let known = match service {
                    ServiceType::Tts => registry.tts(vendor).is_ok(),
                    ServiceType::Stt => registry.stt(vendor).is_ok(),
                };
                if !known {
                    return Err(CoreError::Validation(format!("unknown vendor: {vendor}")));
                }
            }
        }
        RunMode::Chained => {
            let chain = config
                .chain
                .as_ref()
                .ok_or_else(|| CoreError::Validation("chain is required in chained mode".to_string()))?;
            if registry.tts(&chain.tts_vendor).is_err() {
                return Err(CoreError::Validation(format!("unknown tts vendor: {}", chain.tts_vendor)));
            }
            if registry.stt(&chain.stt_vendor).is_err() {
                return Err(CoreError::Validation(format!("unknown stt vendor: {}", chain.stt_vendor)));
            }
        }
    }

    Ok(())
}

/// Expand a run's inputs × vendors into the `NewRunItem`s persisted at
/// creation time (§4.5's item-count laws).
fn expand_items(run_id: RunId, mode: RunMode, vendors: &[String], inputs: &[String], config: &RunConfig) -> Vec<NewRunItem> {
    match mode {
        RunMode::Isolated => {
            let service_str = match config.service {
                Some(ServiceType::Tts) => "tts",
                Some(ServiceType::Stt) => "stt",
                None => unreachable!("validated before expansion"),
            };
            let mut items = Vec::with_capacity(inputs.len() * vendors.len());
            for input in inputs {
                for vendor in vendors {
                    items.push(NewRunItem {
                        run_id,
                        input_text: input.clone(),
                        vendor_label: vendor.clone(),
                        sidecar: base_sidecar(service_str, config),
                    });
                }
            }
            items
        }
        RunMode::Chained => {
            let chain = config.chain.as_ref().expect("validated before expansion");
            let vendor_label = format!("{}->{}", chain.tts_vendor, chain.stt_vendor);
            inputs
                .iter()
                .map(|input| NewRunItem {
                    run_id,
                    input_text: input.clone(),
                    vendor_label: vendor_label.clone(),
                    sidecar: base_sidecar("chained", config),
                })
                .collect()
        }
    }
}

fn base_sidecar(service_type: &str, config: &RunConfig) -> RunItemSidecar {
    RunItemSidecar {
        service_type: Some(service_type.to_string()),
        models: config.models.clone(),
        voice_id: config.voice_id.clone(),
        language: config.language.clone(),
        duration_estimated: false,
        rtf_anomaly: false,
    }
}

/// Per-call timeout helper kept separate from `EngineConfig` so tests can
/// construct short timeouts without touching environment-derived settings.
#[must_use]
pub fn default_timeouts() -> (Duration, Duration) {
    (Duration::from_secs(60), Duration::from_secs(120))
}

#[cfg(test)]
mod tests {
    use super::*;
    use speechbench_core::domain::ChainPairing;
    use speechbench_core::ports::TimeWindow;
    use speechbench_vendors::LocalAdapter;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRepository {
        runs: Mutex<HashMap<RunId, speechbench_core::domain::Run>>,
        items: Mutex<HashMap<Uuid, RunItem>>,
        metrics: Mutex<Vec<StoredMetric>>,
        artifacts: Mutex<HashMap<Uuid, Artifact>>,
    }

    #[async_trait::async_trait]
    impl Repository for FakeRepository {
        async fn create_run(&self, new_run: NewRun) -> Result<speechbench_core::domain::Run, speechbench_core::RepositoryError> {
            let run = speechbench_core::domain::Run {
                id: Uuid::new_v4(),
                created_at: Utc::now(),
                mode: new_run.mode,
                vendors: new_run.vendors,
                config: new_run.config,
                status: RunStatus::Pending,
                started_at: None,
                finished_at: None,
            };
            self.runs.lock().unwrap().insert(run.id, run.clone());
            Ok(run)
        }

        async fn append_items(&self, items: Vec<NewRunItem>) -> Result<Vec<RunItem>, speechbench_core::RepositoryError> {
            let mut created = Vec::with_capacity(items.len());
            for new_item in items {
                let item = RunItem {
                    id: Uuid::new_v4(),
                    run_id: new_item.run_id,
                    input_text: new_item.input_text,
                    vendor_label: new_item.vendor_label,
                    status: RunItemStatus::Pending,
                    audio_artifact_id: None,
                    transcript_artifact_id: None,
                    sidecar: new_item.sidecar,
                    failure_reason: None,
                };
                self.items.lock().unwrap().insert(item.id, item.clone());
                created.push(item);
            }
            Ok(created)
        }

        async fn set_run_status(
            &self,
            run_id: RunId,
            status: RunStatus,
            finished_at: Option<chrono::DateTime<Utc>>,
        ) -> Result<(), speechbench_core::RepositoryError> {
            let mut runs = self.runs.lock().unwrap();
            let run = runs
                .get_mut(&run_id)
                .ok_or_else(|| speechbench_core::RepositoryError::NotFound(run_id.to_string()))?;
            run.status = status;
            if let Some(finished_at) = finished_at {
                run.finished_at = Some(finished_at);
            }
            Ok(())
        }

        async fn set_item_status(
            &self,
            item_id: Uuid,
            status: RunItemStatus,
            failure_reason: Option<String>,
        ) -> Result<(), speechbench_core::RepositoryError> {
            let mut items = self.items.lock().unwrap();
            let item = items
                .get_mut(&item_id)
                .ok_or_else(|| speechbench_core::RepositoryError::NotFound(item_id.to_string()))?;
            item.status = status;
            item.failure_reason = failure_reason;
            Ok(())
        }

        async fn update_item_sidecar(
            &self,
            item_id: Uuid,
            sidecar: RunItemSidecar,
        ) -> Result<(), speechbench_core::RepositoryError> {
            let mut items = self.items.lock().unwrap();
            let item = items
                .get_mut(&item_id)
                .ok_or_else(|| speechbench_core::RepositoryError::NotFound(item_id.to_string()))?;
            item.sidecar = sidecar;
            Ok(())
        }

        async fn record_metric(&self, metric: StoredMetric) -> Result<(), speechbench_core::RepositoryError> {
            self.metrics.lock().unwrap().push(metric);
            Ok(())
        }

        async fn record_artifact(&self, artifact: Artifact) -> Result<(), speechbench_core::RepositoryError> {
            let mut items = self.items.lock().unwrap();
            if let Some(item) = items.get_mut(&artifact.run_item_id) {
                match artifact.kind {
                    ArtifactKind::Audio => item.audio_artifact_id = Some(artifact.id),
                    ArtifactKind::Transcript => item.transcript_artifact_id = Some(artifact.id),
                }
            }
            drop(items);
            self.artifacts.lock().unwrap().insert(artifact.id, artifact);
            Ok(())
        }

        async fn get_run(&self, run_id: RunId) -> Result<speechbench_core::domain::Run, speechbench_core::RepositoryError> {
            self.runs
                .lock()
                .unwrap()
                .get(&run_id)
                .cloned()
                .ok_or_else(|| speechbench_core::RepositoryError::NotFound(run_id.to_string()))
        }

        async fn list_runs(&self, _window: Option<TimeWindow>) -> Result<Vec<speechbench_core::domain::Run>, speechbench_core::RepositoryError> {
            Ok(self.runs.lock().unwrap().values().cloned().collect())
        }

        async fn get_item(&self, item_id: Uuid) -> Result<RunItem, speechbench_core::RepositoryError> {
            self.items
                .lock()
                .unwrap()
                .get(&item_id)
                .cloned()
                .ok_or_else(|| speechbench_core::RepositoryError::NotFound(item_id.to_string()))
        }

        async fn list_items_by_run(&self, run_id: RunId) -> Result<Vec<RunItem>, speechbench_core::RepositoryError> {
            Ok(self
                .items
                .lock()
                .unwrap()
                .values()
                .filter(|i| i.run_id == run_id)
                .cloned()
                .collect())
        }

        async fn list_metrics_by_run(&self, run_id: RunId) -> Result<Vec<StoredMetric>, speechbench_core::RepositoryError> {
            let item_ids: Vec<_> = self
                .items
                .lock()
                .unwrap()
                .values()
                .filter(|i| i.run_id == run_id)
                .map(|i| i.id)
                .collect();
            Ok(self
                .metrics
                .lock()
                .unwrap()
                .iter()
                .filter(|m| item_ids.contains(&m.run_item_id))
                .cloned()
                .collect())
        }

        async fn get_artifact(&self, artifact_id: Uuid) -> Result<Artifact, speechbench_core::RepositoryError> {
            self.artifacts
                .lock()
                .unwrap()
                .get(&artifact_id)
                .cloned()
                .ok_or_else(|| speechbench_core::RepositoryError::NotFound(artifact_id.to_string()))
        }

        async fn metric_values_in_window(&self, name: MetricName, _window: TimeWindow) -> Result<Vec<f64>, speechbench_core::RepositoryError> {
            Ok(self
                .metrics
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.metric.name == name)
                .map(|m| m.metric.value)
                .collect())
        }
    }

    struct FakeArtifactStore;

    #[async_trait::async_trait]
    impl ArtifactStore for FakeArtifactStore {
        async fn put(
            &self,
            kind: ArtifactKind,
            item_id: Uuid,
            content_type: &str,
            bytes: &[u8],
        ) -> Result<String, speechbench_core::RepositoryError> {
            let _ = bytes;
            Ok(speechbench_core::domain::artifact_filename(kind, item_id, content_type))
        }

        async fn get(&self, _locator: &str) -> Result<Vec<u8>, speechbench_core::RepositoryError> {
            Ok(vec![])
        }
    }

    fn test_engine() -> (Engine, Arc<FakeRepository>) {
        let repository = Arc::new(FakeRepository::default());
        let artifact_store: Arc<dyn ArtifactStore> = Arc::new(FakeArtifactStore);
        let mut registry = VendorRegistry::new();
        registry.register_tts(Arc::new(LocalAdapter::new("vendor-a")));
        registry.register_stt(Arc::new(LocalAdapter::new("vendor-a")));
        registry.register_tts(Arc::new(LocalAdapter::new("vendor-b")));
        registry.register_stt(Arc::new(LocalAdapter::new("vendor-b")));

        let config = EngineConfig {
            concurrency: 4,
            synthesize_timeout: Duration::from_secs(5),
            transcribe_timeout: Duration::from_secs(5),
            max_retries: 0,
            default_synth_vendor: "vendor-a".to_string(),
            default_evaluator_vendor: "vendor-b".to_string(),
        };

        let repo_dyn: Arc<dyn Repository> = repository.clone();
        let engine = Engine::new(repo_dyn, artifact_store, Arc::new(registry), config);
        (engine, repository)
    }

    #[tokio::test]
    async fn isolated_tts_run_produces_expected_item_count_and_metrics() {
        let (engine, repository) = test_engine();
        let run_id = engine
            .create_run(
                RunMode::Isolated,
                vec!["vendor-a".to_string()],
                vec!["the quick brown fox".to_string()],
                RunConfig {
                    service: Some(ServiceType::Tts),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // create_run spawns execute_run as a detached task; drive it
        // synchronously here for a deterministic test.
        engine.execute_run(run_id, CancellationToken::new()).await.unwrap();

        let run = repository.get_run(run_id).await.unwrap();
        assert_eq!(run.status, RunStatus::Completed);

        let items = repository.list_items_by_run(run_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, RunItemStatus::Completed);
        assert!(items[0].audio_artifact_id.is_some());
        assert!(items[0].transcript_artifact_id.is_some());

        let metrics = repository.list_metrics_by_run(run_id).await.unwrap();
        let names: Vec<_> = metrics.iter().map(|m| m.metric.name).collect();
        for expected in [
            MetricName::TtsLatency,
            MetricName::AudioDuration,
            MetricName::TtsRtf,
            MetricName::Wer,
            MetricName::Accuracy,
            MetricName::Confidence,
        ] {
            assert!(names.contains(&expected), "missing metric {expected:?}");
        }
    }

    #[tokio::test]
    async fn chained_run_has_single_item_with_combined_label_and_e2e_latency() {
        let (engine, repository) = test_engine();
        let run_id = engine
            .create_run(
                RunMode::Chained,
                vec!["vendor-a".to_string(), "vendor-b".to_string()],
                vec!["hello world".to_string()],
                RunConfig {
                    chain: Some(ChainPairing {
                        tts_vendor: "vendor-a".to_string(),
                        stt_vendor: "vendor-b".to_string(),
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        engine.execute_run(run_id, CancellationToken::new()).await.unwrap();

        let items = repository.list_items_by_run(run_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].vendor_label, "vendor-a->vendor-b");

        let metrics = repository.list_metrics_by_run(run_id).await.unwrap();
        let tts_latency = metrics.iter().find(|m| m.metric.name == MetricName::TtsLatency).unwrap().metric.value;
        let stt_latency = metrics.iter().find(|m| m.metric.name == MetricName::SttLatency).unwrap().metric.value;
        let e2e_latency = metrics.iter().find(|m| m.metric.name == MetricName::E2eLatency).unwrap().metric.value;
        assert!((e2e_latency - (tts_latency + stt_latency)).abs() < 1e-6);
    }

    #[tokio::test]
    async fn batch_isolated_run_item_count_matches_inputs_times_vendors() {
        let (engine, repository) = test_engine();
        let run_id = engine
            .create_run(
                RunMode::Isolated,
                vec!["vendor-a".to_string(), "vendor-b".to_string()],
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                RunConfig {
                    service: Some(ServiceType::Tts),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        engine.execute_run(run_id, CancellationToken::new()).await.unwrap();

        let items = repository.list_items_by_run(run_id).await.unwrap();
        assert_eq!(items.len(), 6);
    }

    #[tokio::test]
    async fn unknown_vendor_is_rejected_before_any_item_is_persisted() {
        let (engine, repository) = test_engine();
        let err = engine
            .create_run(
                RunMode::Isolated,
                vec!["does-not-exist".to_string()],
                vec!["hello".to_string()],
                RunConfig {
                    service: Some(ServiceType::Tts),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(repository.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_inputs_are_rejected() {
        let (engine, _repository) = test_engine();
        let err = engine
            .create_run(
                RunMode::Isolated,
                vec!["vendor-a".to_string()],
                vec![],
                RunConfig {
                    service: Some(ServiceType::Tts),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    fn test_engine_with_delayed_stt(delayed_vendor: &str) -> (Engine, Arc<FakeRepository>) {
        let repository = Arc::new(FakeRepository::default());
        let artifact_store: Arc<dyn ArtifactStore> = Arc::new(FakeArtifactStore);
        let mut registry = VendorRegistry::new();
        registry.register_tts(Arc::new(LocalAdapter::new("vendor-a")));
        registry.register_stt(Arc::new(LocalAdapter::new("vendor-a")));
        registry.register_tts(Arc::new(LocalAdapter::new("vendor-b")));
        registry.register_stt(Arc::new(
            LocalAdapter::new(delayed_vendor).with_simulated_delay(Duration::from_secs(10)),
        ));

        let config = EngineConfig {
            concurrency: 4,
            synthesize_timeout: Duration::from_secs(5),
            transcribe_timeout: Duration::from_millis(50),
            max_retries: 0,
            default_synth_vendor: "vendor-a".to_string(),
            default_evaluator_vendor: "vendor-a".to_string(),
        };

        let repo_dyn: Arc<dyn Repository> = repository.clone();
        let engine = Engine::new(repo_dyn, artifact_store, Arc::new(registry), config);
        (engine, repository)
    }

    #[tokio::test]
    async fn subject_stt_transcribe_exceeding_timeout_fails_item_without_hanging() {
        let (engine, repository) = test_engine_with_delayed_stt("vendor-b");
        let run_id = engine
            .create_run(
                RunMode::Isolated,
                vec!["vendor-b".to_string()],
                vec!["the quick brown fox".to_string()],
                RunConfig {
                    service: Some(ServiceType::Stt),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        engine.execute_run(run_id, CancellationToken::new()).await.unwrap();

        let items = repository.list_items_by_run(run_id).await.unwrap();
        assert_eq!(items[0].status, RunItemStatus::Failed);
        assert_eq!(items[0].failure_reason.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn chained_stt_transcribe_exceeding_timeout_fails_item_without_hanging() {
        let (engine, repository) = test_engine_with_delayed_stt("vendor-b");
        let run_id = engine
            .create_run(
                RunMode::Chained,
                vec!["vendor-a".to_string(), "vendor-b".to_string()],
                vec!["hello world".to_string()],
                RunConfig {
                    chain: Some(ChainPairing {
                        tts_vendor: "vendor-a".to_string(),
                        stt_vendor: "vendor-b".to_string(),
                    }),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        engine.execute_run(run_id, CancellationToken::new()).await.unwrap();

        let items = repository.list_items_by_run(run_id).await.unwrap();
        assert_eq!(items[0].status, RunItemStatus::Failed);
        assert_eq!(items[0].failure_reason.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn vendor_failure_marks_item_failed_without_aborting_siblings() {
        let (engine, repository) = test_engine();
        // Empty text makes LocalAdapter::synthesize fail (non-retryable).
        let run_id = engine
            .create_run(
                RunMode::Isolated,
                vec!["vendor-a".to_string()],
                vec!["   ".to_string(), "a real sentence".to_string()],
                RunConfig {
                    service: Some(ServiceType::Tts),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        engine.execute_run(run_id, CancellationToken::new()).await.unwrap();

        let run = repository.get_run(run_id).await.unwrap();
        assert_eq!(run.status, RunStatus::Partial);

        let items = repository.list_items_by_run(run_id).await.unwrap();
        let failed = items.iter().filter(|i| i.status == RunItemStatus::Failed).count();
        let completed = items.iter().filter(|i| i.status == RunItemStatus::Completed).count();
        assert_eq!(failed, 1);
        assert_eq!(completed, 1);
    }
}
