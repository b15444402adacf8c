//! Generic `reqwest`-based vendor adapter.
//!
//! One struct drives both capabilities: most vendor REST APIs expose a
//! synthesize endpoint and a transcribe endpoint under the same base URL and
//! auth scheme, so there is no reason to duplicate the HTTP plumbing across
//! two types. The per-call config (`SynthesizeConfig`/`TranscribeConfig`)
//! carries everything vendor-specific.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use speechbench_core::VendorError;
use speechbench_core::ports::{
    SttAdapter, SynthesizeConfig, SynthesizeOutput, TranscribeConfig, TranscribeOutput, TtsAdapter,
};

/// Configuration for a single HTTP vendor endpoint.
#[derive(Debug, Clone)]
pub struct HttpVendorConfig {
    pub vendor_id: String,
    pub base_url: String,
    pub api_key: String,
}

/// A vendor reachable over HTTP, implementing both `TtsAdapter` and
/// `SttAdapter`. Construct one per vendor; register only the traits that
/// vendor actually supports.
pub struct HttpVendorAdapter {
    config: HttpVendorConfig,
    client: Client,
}

impl HttpVendorAdapter {
    #[must_use]
    pub fn new(config: HttpVendorConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn is_retryable(status: reqwest::StatusCode) -> bool {
        status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
    }
}

#[derive(Serialize)]
struct SynthesizeRequest<'a> {
    text: &'a str,
    voice_id: Option<&'a str>,
    model: Option<&'a str>,
    language: Option<&'a str>,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    audio_base64: String,
    content_type: String,
    duration_secs: Option<f64>,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    transcript: String,
    confidence: Option<f64>,
}

#[async_trait]
impl TtsAdapter for HttpVendorAdapter {
    fn vendor_id(&self) -> &str {
        &self.config.vendor_id
    }

    async fn synthesize(&self, config: SynthesizeConfig) -> Result<SynthesizeOutput, VendorError> {
        let body = SynthesizeRequest {
            text: &config.text,
            voice_id: config.voice_id.as_deref(),
            model: config.model.as_deref(),
            language: config.language.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/v1/synthesize", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VendorError::CallFailed {
                message: e.to_string(),
                retryable: true,
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VendorError::CallFailed {
                message: format!("synthesize returned {status}"),
                retryable: Self::is_retryable(status),
                status: Some(status.as_u16()),
            });
        }

        let parsed: SynthesizeResponse = response.json().await.map_err(|e| VendorError::CallFailed {
            message: format!("malformed synthesize response: {e}"),
            retryable: false,
            status: Some(status.as_u16()),
        })?;

        let audio = BASE64.decode(&parsed.audio_base64).map_err(|e| VendorError::CallFailed {
            message: format!("invalid audio encoding: {e}"),
            retryable: false,
            status: None,
        })?;

        if audio.is_empty() {
            return Err(VendorError::CallFailed {
                message: "empty audio payload".to_string(),
                retryable: false,
                status: Some(status.as_u16()),
            });
        }

        Ok(SynthesizeOutput {
            audio,
            content_type: parsed.content_type,
            vendor_duration_secs: parsed.duration_secs,
            // This adapter speaks a single buffered JSON response, not a
            // stream, so there is no meaningful first-byte instant to report.
            ttfb_secs: None,
        })
    }
}

#[async_trait]
impl SttAdapter for HttpVendorAdapter {
    fn vendor_id(&self) -> &str {
        &self.config.vendor_id
    }

    async fn transcribe(&self, config: TranscribeConfig) -> Result<TranscribeOutput, VendorError> {
        let part = reqwest::multipart::Part::bytes(config.audio).mime_str(&config.content_type).map_err(|e| {
            VendorError::CallFailed {
                message: format!("bad content type: {e}"),
                retryable: false,
                status: None,
            }
        })?;
        let mut form = reqwest::multipart::Form::new().part("audio", part);
        if let Some(model) = &config.model {
            form = form.text("model", model.clone());
        }
        if let Some(language) = &config.language {
            form = form.text("language", language.clone());
        }

        let response = self
            .client
            .post(format!("{}/v1/transcribe", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VendorError::CallFailed {
                message: e.to_string(),
                retryable: true,
                status: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(VendorError::CallFailed {
                message: format!("transcribe returned {status}"),
                retryable: Self::is_retryable(status),
                status: Some(status.as_u16()),
            });
        }

        let parsed: TranscribeResponse = response.json().await.map_err(|e| VendorError::CallFailed {
            message: format!("malformed transcribe response: {e}"),
            retryable: false,
            status: Some(status.as_u16()),
        })?;

        Ok(TranscribeOutput {
            transcript: parsed.transcript,
            confidence: parsed.confidence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_round_trips_ascii() {
        let decoded = BASE64.decode("aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn base64_rejects_invalid_byte() {
        assert!(BASE64.decode("!!!!").is_err());
    }
}
