//! Engine configuration: concurrency, timeouts, and the default vendors
//! used as the held-fixed side of an isolated run (§4.5, §6).

use std::time::Duration;

use speechbench_core::Settings;

/// Process-wide engine configuration, derived from [`Settings`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-run bounded concurrency `W` (§5).
    pub concurrency: usize,
    pub synthesize_timeout: Duration,
    pub transcribe_timeout: Duration,
    pub max_retries: u32,
    /// Vendor used to render the stimulus audio in isolated-STT runs.
    pub default_synth_vendor: String,
    /// Vendor used to score the produced audio in isolated-TTS runs.
    pub default_evaluator_vendor: String,
}

impl EngineConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            concurrency: settings.max_concurrency,
            synthesize_timeout: settings.call_timeout,
            transcribe_timeout: settings.call_timeout * 2,
            max_retries: settings.max_retries,
            default_synth_vendor: settings
                .default_synth_vendor
                .clone()
                .unwrap_or_else(|| "local".to_string()),
            default_evaluator_vendor: settings
                .default_evaluator_vendor
                .clone()
                .unwrap_or_else(|| "local".to_string()),
        }
    }
}
