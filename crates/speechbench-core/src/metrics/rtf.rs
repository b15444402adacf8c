//! Real-time factor and accuracy derivations (§4.3.3, §4.3).

/// Anomaly thresholds: an RTF outside this band is still recorded but
/// flagged suspicious rather than rejected.
const RTF_ANOMALY_LOW: f64 = 0.01;
const RTF_ANOMALY_HIGH: f64 = 100.0;

/// Result of computing a real-time factor against a probed audio duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RtfResult {
    pub value: f64,
    pub anomaly: bool,
}

/// Compute `processing_time / audio_duration`, flagging anomalies per
/// §4.3.3. Returns `None` when `audio_duration <= 0` (no ratio to report).
#[must_use]
pub fn real_time_factor(processing_time_secs: f64, audio_duration_secs: f64) -> Option<RtfResult> {
    if audio_duration_secs <= 0.0 {
        return None;
    }
    let value = processing_time_secs / audio_duration_secs;
    let anomaly = !(RTF_ANOMALY_LOW..=RTF_ANOMALY_HIGH).contains(&value);
    Some(RtfResult { value, anomaly })
}

/// `accuracy = 100 * max(0, 1 - wer)`, clipped at 0 on pathological (>1) WER.
#[must_use]
pub fn accuracy_from_wer(wer: f64) -> f64 {
    100.0 * (1.0 - wer).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_when_duration_non_positive() {
        assert!(real_time_factor(1.0, 0.0).is_none());
        assert!(real_time_factor(1.0, -1.0).is_none());
    }

    #[test]
    fn flags_anomalous_ratios() {
        let too_fast = real_time_factor(0.001, 10.0).unwrap();
        assert!(too_fast.anomaly);

        let too_slow = real_time_factor(1000.0, 1.0).unwrap();
        assert!(too_slow.anomaly);

        let normal = real_time_factor(2.0, 10.0).unwrap();
        assert!(!normal.anomaly);
    }

    #[test]
    fn accuracy_matches_wer_law() {
        assert!((accuracy_from_wer(0.0) - 100.0).abs() < 1e-9);
        assert!((accuracy_from_wer(0.25) - 75.0).abs() < 1e-9);
        assert!((accuracy_from_wer(1.5) - 0.0).abs() < 1e-9);
    }
}
