//! Aggregation service (§4.7): dashboard stats, service mix, vendor usage,
//! top pairings, and latency percentiles over a lookback window.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};

use speechbench_core::domain::{MetricName, RunStatus};
use speechbench_core::error::CoreError;
use speechbench_core::ports::{Repository, TimeWindow};

/// Top-level dashboard summary (§6's `DashboardStats`).
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStats {
    pub total_runs: usize,
    pub success_rate: f64,
    /// Mean of `e2e_latency` where present, else `tts_latency`/`stt_latency`.
    pub avg_latency: f64,
}

/// Item counts partitioned by which artifacts they produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceMix {
    pub tts: usize,
    pub stt: usize,
    pub e2e: usize,
}

/// Per-capability vendor usage counts (§4.7): a vendor selected as the TTS
/// side of an attempt and the same vendor selected as the STT side are
/// counted separately, since they are distinct adapter-registry lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorUsage {
    pub tts: HashMap<String, usize>,
    pub stt: HashMap<String, usize>,
}

/// One `(tts_vendor, stt_vendor)` pairing's aggregate performance.
#[derive(Debug, Clone, PartialEq)]
pub struct PairingStats {
    pub tts_vendor: String,
    pub stt_vendor: String,
    pub tests: usize,
    pub avg_wer: f64,
}

/// p50/p90 for one metric, each with the sample count it was computed over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Percentiles {
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub sample_count: usize,
}

/// Computes the derived, read-only views over run/run-item data.
///
/// Stateless aside from the repository handle: every method re-queries
/// the window freshly rather than caching, since runs complete
/// continuously while the dashboard is open.
#[derive(Clone)]
pub struct AggregationService {
    repository: Arc<dyn Repository>,
    lookback_days: i64,
}

impl AggregationService {
    #[must_use]
    pub fn new(repository: Arc<dyn Repository>, lookback_days: i64) -> Self {
        Self {
            repository,
            lookback_days,
        }
    }

    fn default_window(&self) -> TimeWindow {
        let until = Utc::now();
        let since = until - ChronoDuration::days(self.lookback_days.max(1));
        TimeWindow { since, until }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, CoreError> {
        let window = self.default_window();
        let runs = self.repository.list_runs(Some(window)).await?;

        let total_runs = runs.len();
        let completed = runs.iter().filter(|r| r.status == RunStatus::Completed).count();
        let success_rate = if total_runs == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let rate = completed as f64 / total_runs as f64;
            rate
        };

        let e2e = self.repository.metric_values_in_window(MetricName::E2eLatency, window).await?;
        let avg_latency = if e2e.is_empty() {
            let tts = self.repository.metric_values_in_window(MetricName::TtsLatency, window).await?;
            let stt = self.repository.metric_values_in_window(MetricName::SttLatency, window).await?;
            let combined: Vec<f64> = tts.into_iter().chain(stt).collect();
            mean(&combined)
        } else {
            mean(&e2e)
        };

        Ok(DashboardStats {
            total_runs,
            success_rate,
            avg_latency,
        })
    }

    /// Service mix (§4.7): TTS has audio but no transcript, STT has
    /// transcript but no audio, E2E has both.
    pub async fn service_mix(&self) -> Result<ServiceMix, CoreError> {
        let window = self.default_window();
        let runs = self.repository.list_runs(Some(window)).await?;

        let mut mix = ServiceMix::default();
        for run in runs {
            let items = self.repository.list_items_by_run(run.id).await?;
            for item in items {
                match (item.audio_artifact_id.is_some(), item.transcript_artifact_id.is_some()) {
                    (true, true) => mix.e2e += 1,
                    (true, false) => mix.tts += 1,
                    (false, true) => mix.stt += 1,
                    (false, false) => {}
                }
            }
        }
        Ok(mix)
    }

    /// Per-capability vendor usage counts (§4.7): isolated items are
    /// attributed to their single capability via the sidecar's
    /// `service_type`; chained items split their `"a->b"` label into a TTS
    /// selection (`a`) and an STT selection (`b`), counted independently.
    pub async fn vendor_usage(&self) -> Result<VendorUsage, CoreError> {
        let window = self.default_window();
        let runs = self.repository.list_runs(Some(window)).await?;

        let mut usage = VendorUsage::default();
        for run in runs {
            let items = self.repository.list_items_by_run(run.id).await?;
            for item in items {
                if let Some((tts_vendor, stt_vendor)) = item.vendor_label.split_once("->") {
                    *usage.tts.entry(tts_vendor.to_string()).or_insert(0) += 1;
                    *usage.stt.entry(stt_vendor.to_string()).or_insert(0) += 1;
                    continue;
                }
                match item.sidecar.service_type.as_deref() {
                    Some("stt") => {
                        *usage.stt.entry(item.vendor_label.clone()).or_insert(0) += 1;
                    }
                    _ => {
                        *usage.tts.entry(item.vendor_label.clone()).or_insert(0) += 1;
                    }
                }
            }
        }
        Ok(usage)
    }

    /// Top chained-mode vendor pairings by volume, each with its average WER.
    pub async fn top_pairings(&self) -> Result<Vec<PairingStats>, CoreError> {
        let window = self.default_window();
        let runs = self.repository.list_runs(Some(window)).await?;

        let mut grouped: HashMap<(String, String), Vec<f64>> = HashMap::new();
        for run in runs {
            let items = self.repository.list_items_by_run(run.id).await?;
            for item in items {
                let Some((tts_vendor, stt_vendor)) = item.vendor_label.split_once("->") else {
                    continue;
                };
                let metrics = self.repository.list_metrics_by_run(item.run_id).await?;
                let wer = metrics
                    .iter()
                    .find(|m| m.run_item_id == item.id && m.metric.name == MetricName::Wer)
                    .map(|m| m.metric.value);
                if let Some(wer) = wer {
                    grouped
                        .entry((tts_vendor.to_string(), stt_vendor.to_string()))
                        .or_default()
                        .push(wer);
                }
            }
        }

        let mut pairings: Vec<PairingStats> = grouped
            .into_iter()
            .map(|((tts_vendor, stt_vendor), wers)| PairingStats {
                tts_vendor,
                stt_vendor,
                tests: wers.len(),
                avg_wer: mean(&wers),
            })
            .collect();
        pairings.sort_by(|a, b| b.tests.cmp(&a.tests));
        Ok(pairings)
    }

    /// p50/p90 for every latency metric, per §4.7's linear-interpolation
    /// algorithm: sort ascending, `p_k` at fractional index `(n-1)*k`,
    /// interpolate between the straddling neighbors.
    pub async fn percentiles(&self) -> Result<HashMap<MetricName, Percentiles>, CoreError> {
        let window = self.default_window();
        let mut out = HashMap::new();
        for name in [
            MetricName::TtsLatency,
            MetricName::SttLatency,
            MetricName::E2eLatency,
        ] {
            let mut values = self.repository.metric_values_in_window(name, window).await?;
            values.sort_by(|a, b| a.partial_cmp(b).expect("metric values are finite"));
            out.insert(
                name,
                Percentiles {
                    p50: percentile(&values, 0.50),
                    p90: percentile(&values, 0.90),
                    sample_count: values.len(),
                },
            );
        }
        Ok(out)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let len = values.len() as f64;
    values.iter().sum::<f64>() / len
}

/// `values` must already be sorted ascending.
fn percentile(values: &[f64], k: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    if values.len() == 1 {
        return Some(values[0]);
    }

    #[allow(clippy::cast_precision_loss)]
    let last_index = (values.len() - 1) as f64;
    let pos = last_index * k;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(values[lower]);
    }
    let frac = pos - pos.floor();
    Some(values[lower] + (values[upper] - values[lower]) * frac)
}
