//! Cross-cutting timeout and bounded-retry wrapper for vendor adapters.
//!
//! Keeps individual adapters (`HttpVendorAdapter`, `LocalAdapter`) free of
//! retry/timeout logic — those concerns apply uniformly to every vendor and
//! belong at a single seam, not duplicated per adapter.

use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

use speechbench_core::VendorError;
use speechbench_core::ports::{
    SttAdapter, SynthesizeConfig, SynthesizeOutput, TranscribeConfig, TranscribeOutput, TtsAdapter,
};

/// Wraps any adapter with a per-call timeout and bounded exponential-backoff
/// retry on retryable errors.
pub struct TimedAdapter<A> {
    inner: A,
    timeout: Duration,
    max_retries: u32,
}

impl<A> TimedAdapter<A> {
    #[must_use]
    pub fn new(inner: A, timeout: Duration, max_retries: u32) -> Self {
        Self {
            inner,
            timeout,
            max_retries,
        }
    }

    async fn run_with_retry<T, F, Fut>(&self, op_name: &str, mut call: F) -> Result<T, VendorError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, VendorError>>,
    {
        let mut attempt = 0;
        loop {
            let result = tokio::time::timeout(self.timeout, call()).await;
            let outcome = match result {
                Ok(inner_result) => inner_result,
                Err(_) => Err(VendorError::Timeout),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_retries && err.is_retryable() => {
                    warn!(op_name, attempt, error = %err, "retrying vendor call");
                    let backoff = Duration::from_millis(100 * 2u64.pow(attempt));
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<A: TtsAdapter + Sync> TtsAdapter for TimedAdapter<A> {
    fn vendor_id(&self) -> &str {
        self.inner.vendor_id()
    }

    async fn synthesize(&self, config: SynthesizeConfig) -> Result<SynthesizeOutput, VendorError> {
        self.run_with_retry("synthesize", || self.inner.synthesize(config.clone())).await
    }
}

#[async_trait]
impl<A: SttAdapter + Sync> SttAdapter for TimedAdapter<A> {
    fn vendor_id(&self) -> &str {
        self.inner.vendor_id()
    }

    async fn transcribe(&self, config: TranscribeConfig) -> Result<TranscribeOutput, VendorError> {
        self.run_with_retry("transcribe", || self.inner.transcribe(config.clone())).await
    }
}
