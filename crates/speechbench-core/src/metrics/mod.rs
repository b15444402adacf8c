//! Metric computations: WER, confidence normalization, real-time factor.
//!
//! Pure functions, no I/O — directly unit-testable without a repository or
//! vendor adapter in the loop.

pub mod confidence;
pub mod rtf;
pub mod wer;

pub use confidence::normalize_confidence;
pub use rtf::{RtfResult, accuracy_from_wer, real_time_factor};
pub use wer::{normalize_for_wer, word_edit_distance, word_error_rate};
