use web_time::Instant;

use crate::diff::Classification;
use crate::math;

/// One live measurement taken while a test is running
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSample {
    /// Seconds since the first input of the test
    pub elapsed: f64,
    /// Rounded speed over correctly typed characters
    pub wpm: u32,
    /// Rounded speed over every typed character
    pub raw_wpm: u32,
    /// Typed characters that aren't correct at the time of sampling
    pub errors: usize,
}

/// Records the metrics history of a running test
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    started_at: Option<Instant>,
    history: Vec<LiveSample>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the session start. Later calls keep the first timestamp.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Check if timing has started
    pub const fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub const fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Take a sample of the current input state
    ///
    /// Returns `None` and records nothing if the session hasn't started, if no time has
    /// passed since the start, or if `now` lies before the previous sample.
    pub fn sample(&mut self, now: Instant, classification: &Classification) -> Option<LiveSample> {
        let started_at = self.started_at?;
        let elapsed = now.saturating_duration_since(started_at).as_secs_f64();

        if elapsed <= 0.0 {
            return None;
        }

        if self.history.last().is_some_and(|last| elapsed < last.elapsed) {
            return None;
        }

        let typed = classification.typed();
        let correct = classification.correct();

        let sample = LiveSample {
            elapsed,
            wpm: math::wpm(correct, elapsed).round() as u32,
            raw_wpm: math::wpm(typed, elapsed).round() as u32,
            errors: typed - correct,
        };

        self.history.push(sample);
        Some(sample)
    }

    /// The metrics history, oldest sample first
    pub fn history(&self) -> &[LiveSample] {
        &self.history
    }

    pub fn wpm_series(&self) -> Vec<u32> {
        self.history.iter().map(|sample| sample.wpm).collect()
    }

    pub fn raw_wpm_series(&self) -> Vec<u32> {
        self.history.iter().map(|sample| sample.raw_wpm).collect()
    }

    pub fn error_series(&self) -> Vec<usize> {
        self.history.iter().map(|sample| sample.errors).collect()
    }

    /// Forget the start timestamp and every sample
    pub fn reset(&mut self) {
        self.started_at = None;
        self.history.clear();
    }
}
