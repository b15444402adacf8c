//! Vendor adapter ports (§4.2).
//!
//! A vendor adapter wraps a single TTS or STT backend behind a uniform
//! async interface. Adapters never touch timing, retries, or persistence —
//! those are cross-cutting concerns applied by the engine via `TimedAdapter`.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::VendorError;

/// Input to a text-to-speech call.
#[derive(Debug, Clone)]
pub struct SynthesizeConfig {
    pub text: String,
    pub voice_id: Option<String>,
    pub model: Option<String>,
    pub language: Option<String>,
}

/// Output of a successful text-to-speech call.
#[derive(Debug, Clone)]
pub struct SynthesizeOutput {
    /// Raw encoded audio bytes (WAV/MP3/OGG/FLAC — see `content_type`).
    pub audio: Vec<u8>,
    /// MIME type of `audio`, e.g. `audio/wav`.
    pub content_type: String,
    /// Audio duration in seconds, if the vendor reports it directly.
    pub vendor_duration_secs: Option<f64>,
    /// Seconds to the first received byte, for vendors that stream their
    /// response. `None` for request/response vendors — `tts_ttfb` is an
    /// optional metric (§4.3) and is simply not recorded in that case.
    pub ttfb_secs: Option<f64>,
}

/// Input to a speech-to-text call.
#[derive(Debug, Clone)]
pub struct TranscribeConfig {
    pub audio: Vec<u8>,
    pub content_type: String,
    pub model: Option<String>,
    pub language: Option<String>,
}

/// Output of a successful speech-to-text call.
#[derive(Debug, Clone)]
pub struct TranscribeOutput {
    pub transcript: String,
    /// Vendor-reported confidence, in whatever scale the vendor uses.
    /// Normalized downstream via `metrics::normalize_confidence`.
    pub confidence: Option<f64>,
}

/// A text-to-speech vendor adapter.
#[async_trait]
pub trait TtsAdapter: Send + Sync {
    /// Stable identifier used in vendor labels and registry lookups.
    fn vendor_id(&self) -> &str;

    async fn synthesize(&self, config: SynthesizeConfig) -> Result<SynthesizeOutput, VendorError>;
}

/// A speech-to-text vendor adapter.
#[async_trait]
pub trait SttAdapter: Send + Sync {
    fn vendor_id(&self) -> &str;

    async fn transcribe(&self, config: TranscribeConfig) -> Result<TranscribeOutput, VendorError>;
}

/// Extra per-call parameters threaded from `RunConfig::models`/`voice_id` into
/// a `SynthesizeConfig`/`TranscribeConfig`. Kept separate from the port
/// traits so adapters never need to know about `RunConfig`.
#[must_use]
pub fn model_for_vendor(models: &HashMap<String, String>, vendor_id: &str) -> Option<String> {
    models.get(vendor_id).cloned()
}
