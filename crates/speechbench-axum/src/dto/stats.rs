//! DTOs for the aggregation API (§4.7, §6's `DashboardStats`/`Percentiles`).

use std::collections::HashMap;

use serde::Serialize;

use speechbench_engine::aggregation::{DashboardStats, PairingStats, Percentiles, ServiceMix, VendorUsage};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardResponse {
    pub total_runs: usize,
    pub success_rate: f64,
    pub avg_latency: f64,
    pub service_mix: ServiceMixDto,
    pub vendor_usage: VendorUsageDto,
}

/// Per-capability vendor selection counts (§4.7): a vendor used as the TTS
/// side of an attempt and the same vendor used as the STT side are reported
/// separately.
#[derive(Debug, Clone, Serialize)]
pub struct VendorUsageDto {
    pub tts: HashMap<String, usize>,
    pub stt: HashMap<String, usize>,
}

impl From<VendorUsage> for VendorUsageDto {
    fn from(usage: VendorUsage) -> Self {
        Self {
            tts: usage.tts,
            stt: usage.stt,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceMixDto {
    pub tts: usize,
    pub stt: usize,
    pub e2e: usize,
}

impl From<ServiceMix> for ServiceMixDto {
    fn from(mix: ServiceMix) -> Self {
        Self {
            tts: mix.tts,
            stt: mix.stt,
            e2e: mix.e2e,
        }
    }
}

impl DashboardResponse {
    #[must_use]
    pub fn new(stats: DashboardStats, service_mix: ServiceMix, vendor_usage: VendorUsage) -> Self {
        Self {
            total_runs: stats.total_runs,
            success_rate: stats.success_rate,
            avg_latency: stats.avg_latency,
            service_mix: service_mix.into(),
            vendor_usage: vendor_usage.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PairingDto {
    pub tts_vendor: String,
    pub stt_vendor: String,
    pub tests: usize,
    pub avg_wer: f64,
}

impl From<PairingStats> for PairingDto {
    fn from(p: PairingStats) -> Self {
        Self {
            tts_vendor: p.tts_vendor,
            stt_vendor: p.stt_vendor,
            tests: p.tests,
            avg_wer: p.avg_wer,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PercentileDto {
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub sample_count: usize,
}

impl From<Percentiles> for PercentileDto {
    fn from(p: Percentiles) -> Self {
        Self {
            p50: p.p50,
            p90: p.p90,
            sample_count: p.sample_count,
        }
    }
}
