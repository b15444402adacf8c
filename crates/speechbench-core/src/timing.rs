//! Monotonic timing primitives.
//!
//! All latency and TTFB measurements MUST go through [`Stopwatch`]; wall-clock
//! timestamps (`chrono::DateTime<Utc>`) are used only for human-readable
//! `started_at`/`finished_at` fields and are never compared for elapsed time.

use std::time::Instant;

/// A running stopwatch started at some point in the past.
///
/// Backed by `std::time::Instant`, which is guaranteed monotonic and
/// unaffected by wall-clock adjustments (NTP steps, DST, manual clock
/// changes).
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start a new stopwatch right now.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds elapsed since [`Stopwatch::start`], as a sub-millisecond
    /// precision float.
    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn elapsed_is_monotonically_increasing() {
        let sw = Stopwatch::start();
        let first = sw.elapsed();
        sleep(Duration::from_millis(5));
        let second = sw.elapsed();
        assert!(second >= first);
        assert!(second > 0.0);
    }
}
