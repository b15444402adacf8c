//! Audio duration probe (§4.4).
//!
//! Priority order: a vendor-reported duration wins outright; otherwise the
//! container is parsed via `symphonia`; otherwise a documented
//! bitrate-per-content-type estimate is used and flagged `estimated: true`.
//! A duration that is non-positive or exceeds 24 hours is rejected and
//! treated as absent rather than silently propagated.

use std::io::Cursor;

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

const MAX_DURATION_SECS: f64 = 24.0 * 60.0 * 60.0;

/// Result of probing an audio blob for its duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationProbe {
    /// Duration in seconds, or `None` if it could not be determined (or was
    /// rejected as out of bounds).
    pub seconds: Option<f64>,
    /// Set when `seconds` came from the size-based fallback rather than a
    /// vendor report or container parse — propagated to the run-item
    /// sidecar so RTF is never silently treated as precise.
    pub estimated: bool,
}

/// Probe `audio`'s duration, preferring `vendor_duration_secs` when present.
#[must_use]
pub fn probe_duration(audio: &[u8], content_type: &str, vendor_duration_secs: Option<f64>) -> DurationProbe {
    if let Some(seconds) = vendor_duration_secs.and_then(validate) {
        return DurationProbe {
            seconds: Some(seconds),
            estimated: false,
        };
    }

    if let Some(seconds) = probe_container(audio, content_type).and_then(validate) {
        return DurationProbe {
            seconds: Some(seconds),
            estimated: false,
        };
    }

    if let Some(seconds) = estimate_from_size(audio.len(), content_type).and_then(validate) {
        return DurationProbe {
            seconds: Some(seconds),
            estimated: true,
        };
    }

    DurationProbe {
        seconds: None,
        estimated: false,
    }
}

fn validate(seconds: f64) -> Option<f64> {
    (seconds.is_finite() && seconds > 0.0 && seconds <= MAX_DURATION_SECS).then_some(seconds)
}

fn probe_container(audio: &[u8], content_type: &str) -> Option<f64> {
    let mut hint = Hint::new();
    if let Some(ext) = extension_for(content_type) {
        hint.with_extension(ext);
    }

    let cursor = Cursor::new(audio.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .ok()?;

    let track = probed.format.default_track()?;
    let params = &track.codec_params;
    let n_frames = params.n_frames?;
    let sample_rate = params.sample_rate?;
    if sample_rate == 0 {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let seconds = n_frames as f64 / f64::from(sample_rate);
    Some(seconds)
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => Some("wav"),
        "audio/mpeg" | "audio/mp3" => Some("mp3"),
        "audio/ogg" | "audio/vorbis" => Some("ogg"),
        "audio/flac" | "audio/x-flac" => Some("flac"),
        _ => None,
    }
}

/// Documented bitrate assumption per content type, used only once both the
/// vendor report and the container parse have failed.
fn assumed_bitrate_bps(content_type: &str) -> u32 {
    match content_type {
        "audio/wav" | "audio/x-wav" | "audio/wave" => 256_000, // 16-bit/16kHz mono PCM
        "audio/ogg" | "audio/vorbis" => 112_000,
        "audio/flac" | "audio/x-flac" => 800_000,
        _ => 128_000, // mp3 and anything unrecognized
    }
}

fn estimate_from_size(byte_len: usize, content_type: &str) -> Option<f64> {
    if byte_len == 0 {
        return None;
    }
    let bits_per_sec = f64::from(assumed_bitrate_bps(content_type));

    #[allow(clippy::cast_precision_loss)]
    let bits = byte_len as f64 * 8.0;
    Some(bits / bits_per_sec)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: u32, sample_rate: u32) -> Vec<u8> {
        let bytes_per_sample = 2u32;
        let data_len = samples * bytes_per_sample;
        let mut buf = Vec::with_capacity(44 + data_len as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_len).to_le_bytes());
        buf.extend_from_slice(b"WAVE");
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&(sample_rate * bytes_per_sample).to_le_bytes());
        buf.extend_from_slice(&(bytes_per_sample as u16).to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_len.to_le_bytes());
        buf.extend(std::iter::repeat(0u8).take(data_len as usize));
        buf
    }

    #[test]
    fn vendor_reported_duration_wins_outright() {
        let probe = probe_duration(&[], "audio/mpeg", Some(12.5));
        assert_eq!(probe.seconds, Some(12.5));
        assert!(!probe.estimated);
    }

    #[test]
    fn negative_vendor_duration_is_rejected() {
        let probe = probe_duration(&wav_bytes(16_000, 16_000), "audio/wav", Some(-1.0));
        // Falls through to the container parse, which succeeds for a real WAV.
        assert!(probe.seconds.is_some());
        assert!(!probe.estimated);
    }

    #[test]
    fn container_parse_recovers_wav_duration() {
        let audio = wav_bytes(16_000, 16_000); // 1 second at 16kHz
        let probe = probe_duration(&audio, "audio/wav", None);
        assert!((probe.seconds.unwrap() - 1.0).abs() < 0.01);
        assert!(!probe.estimated);
    }

    #[test]
    fn size_based_fallback_is_flagged_estimated() {
        let garbage = vec![0xFFu8; 16_000]; // not a parseable container
        let probe = probe_duration(&garbage, "audio/mpeg", None);
        assert!(probe.seconds.is_some());
        assert!(probe.estimated);
    }

    #[test]
    fn implausible_duration_is_rejected_outright() {
        let probe = probe_duration(&[], "audio/mpeg", Some(100_000.0));
        assert!(probe.seconds.is_none());
    }

    #[test]
    fn empty_audio_has_no_estimate() {
        let probe = probe_duration(&[], "audio/mpeg", None);
        assert!(probe.seconds.is_none());
        assert!(!probe.estimated);
    }
}
