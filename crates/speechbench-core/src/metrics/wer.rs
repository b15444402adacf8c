//! Word error rate: text normalization and word-level edit distance.

use std::sync::OnceLock;

use regex::Regex;

/// Unicode punctuation (general category P*), matched via `regex`'s Unicode
/// character class support rather than an ASCII-only hand check, so
/// non-Latin punctuation normalizes the same way.
fn punctuation_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{P}").expect("valid punctuation regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Normalize a string for WER scoring: lowercase, strip punctuation, collapse
/// whitespace, trim. Idempotent: `normalize(normalize(s)) == normalize(s)`.
#[must_use]
pub fn normalize_for_wer(s: &str) -> String {
    let lowered = s.to_lowercase();
    let stripped = punctuation_re().replace_all(&lowered, "");
    let collapsed = whitespace_re().replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Word-level edit distance (equal-weight substitution/insertion/deletion)
/// between two already-normalized strings.
#[must_use]
pub fn word_edit_distance(reference: &str, hypothesis: &str) -> usize {
    let r: Vec<&str> = reference.split_whitespace().collect();
    let h: Vec<&str> = hypothesis.split_whitespace().collect();

    let mut dp = vec![vec![0usize; h.len() + 1]; r.len() + 1];
    for (i, row) in dp.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=h.len() {
        dp[0][j] = j;
    }
    for i in 1..=r.len() {
        for j in 1..=h.len() {
            dp[i][j] = if r[i - 1] == h[j - 1] {
                dp[i - 1][j - 1]
            } else {
                1 + dp[i - 1][j].min(dp[i][j - 1]).min(dp[i - 1][j - 1])
            };
        }
    }
    dp[r.len()][h.len()]
}

/// Normalized word error rate: `edits / max(1, reference_word_count)`.
///
/// Deterministic and reproducible: both inputs are run through
/// [`normalize_for_wer`] before scoring. May exceed 1.0 on pathological
/// hypotheses; callers clip to `[0, inf)` (it already is, since edit
/// distance and word counts are non-negative).
#[must_use]
pub fn word_error_rate(reference: &str, hypothesis: &str) -> f64 {
    let norm_ref = normalize_for_wer(reference);
    let norm_hyp = normalize_for_wer(hypothesis);

    let ref_word_count = norm_ref.split_whitespace().count().max(1);
    let edits = word_edit_distance(&norm_ref, &norm_hyp);

    #[allow(clippy::cast_precision_loss)]
    let wer = edits as f64 / ref_word_count as f64;
    wer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_is_idempotent() {
        let s = "Hello,  World!  This is... a TEST.";
        let once = normalize_for_wer(s);
        let twice = normalize_for_wer(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn punctuation_and_case_are_ignored() {
        let wer = word_error_rate("Hello, world.", "hello world");
        assert!((wer - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counts_substitutions_insertions_deletions() {
        // reference: "the quick brown fox" (4 words)
        // hypothesis: "the quick red fox jumps" -> sub(brown->red), ins(jumps) = 2 edits
        let wer = word_error_rate("the quick brown fox", "the quick red fox jumps");
        assert!((wer - 0.5).abs() < 1e-9);
    }

    #[test]
    fn empty_reference_does_not_divide_by_zero() {
        let wer = word_error_rate("", "hello");
        assert!(wer.is_finite());
    }
}
