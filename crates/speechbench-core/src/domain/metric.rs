//! Metric domain types — the closed vocabulary of measurements.
//!
//! The spec describes metrics as "a named numeric measurement...name in a
//! closed vocabulary". Rather than a free `String` name (which would let a
//! repository or adapter accidentally invent an eleventh metric), that
//! closed vocabulary is represented as a Rust enum: the type system enforces
//! the closure the spec asks for.

use serde::{Deserialize, Serialize};

use super::run_item::RunItemId;

/// The closed set of metric names this system ever records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TtsLatency,
    TtsTtfb,
    SttLatency,
    E2eLatency,
    AudioDuration,
    TtsRtf,
    SttRtf,
    Wer,
    Accuracy,
    Confidence,
}

impl MetricName {
    /// Stable string key, used for the `metrics_summary` rendering and for
    /// storage as a `TEXT` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TtsLatency => "tts_latency",
            Self::TtsTtfb => "tts_ttfb",
            Self::SttLatency => "stt_latency",
            Self::E2eLatency => "e2e_latency",
            Self::AudioDuration => "audio_duration",
            Self::TtsRtf => "tts_rtf",
            Self::SttRtf => "stt_rtf",
            Self::Wer => "wer",
            Self::Accuracy => "accuracy",
            Self::Confidence => "confidence",
        }
    }

    /// Parse a stored metric name back into the closed enum.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "tts_latency" => Self::TtsLatency,
            "tts_ttfb" => Self::TtsTtfb,
            "stt_latency" => Self::SttLatency,
            "e2e_latency" => Self::E2eLatency,
            "audio_duration" => Self::AudioDuration,
            "tts_rtf" => Self::TtsRtf,
            "stt_rtf" => Self::SttRtf,
            "wer" => Self::Wer,
            "accuracy" => Self::Accuracy,
            "confidence" => Self::Confidence,
            _ => return None,
        })
    }

    /// The unit this metric is recorded in.
    #[must_use]
    pub const fn unit(self) -> MetricUnit {
        match self {
            Self::TtsLatency
            | Self::TtsTtfb
            | Self::SttLatency
            | Self::E2eLatency
            | Self::AudioDuration => MetricUnit::Seconds,
            Self::TtsRtf | Self::SttRtf => MetricUnit::Ratio, // "x" multiplier
            Self::Wer | Self::Confidence => MetricUnit::Ratio,
            Self::Accuracy => MetricUnit::Percent,
        }
    }
}

/// Unit a metric value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Seconds,
    Ratio,
    Percent,
}

/// A single measurement attached to a run item.
///
/// Invariants enforced by the repository, not this type: no duplicate
/// `(run_item, name)` pairs, values finite, ratios in `[0, 1]` (WER may
/// exceed 1, clipped to `[0, inf)`), percentages in `[0, 100]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metric {
    pub name: MetricName,
    pub value: f64,
    pub unit: MetricUnit,
}

impl Metric {
    #[must_use]
    pub fn new(name: MetricName, value: f64) -> Self {
        Self {
            name,
            value,
            unit: name.unit(),
        }
    }
}

/// A metric row attached to a specific run item, as stored by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMetric {
    pub run_item_id: RunItemId,
    pub metric: Metric,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_string() {
        for name in [
            MetricName::TtsLatency,
            MetricName::TtsTtfb,
            MetricName::SttLatency,
            MetricName::E2eLatency,
            MetricName::AudioDuration,
            MetricName::TtsRtf,
            MetricName::SttRtf,
            MetricName::Wer,
            MetricName::Accuracy,
            MetricName::Confidence,
        ] {
            assert_eq!(MetricName::parse(name.as_str()), Some(name));
        }
    }

    #[test]
    fn unknown_name_rejected() {
        assert_eq!(MetricName::parse("not_a_metric"), None);
    }
}
