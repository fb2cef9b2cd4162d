//! # Result Module - Final Test Metrics
//!
//! The final result is computed exactly once, at the moment a test finishes, from
//! the frozen input classification, the configuration and the metrics history.
//! [`FinalResult::calculate`] is a pure function of those inputs.
//!
//! ## Formulas
//!
//! - `wpm = (correct / 5) / (elapsed / 60)`
//! - `raw_wpm = (typed / 5) / (elapsed / 60)`
//! - `accuracy = correct / (correct + incorrect) * 100`
//! - `consistency = max(0, (1 - std_dev / mean) * 100)` over the sampled WPM values
//!
//! Every value is kept unrounded; use the `*_rounded` accessors for display.

use crate::config::{TestConfig, TestMode};
use crate::diff::Classification;
use crate::math::{self, Consistency};
use crate::recorder::LiveSample;

/// Metrics of a finished test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalResult {
    pub wpm: f64,
    pub raw_wpm: f64,
    /// Percentage between 0.0 - 100.0
    pub accuracy: f64,
    /// Percentage between 0.0 - 100.0
    pub consistency: f64,
    pub correct_chars: usize,
    pub incorrect_chars: usize,
    /// Characters typed past the end of the source text
    pub missed_chars: usize,
    pub elapsed_seconds: f64,
}

impl FinalResult {
    /// Calculate the final result of a test
    ///
    /// * `classification` - The classification of the final input
    /// * `config` - The configuration the test ran with
    /// * `history` - Every live sample taken during the test
    /// * `counted_seconds` - The value of the tick counter when the test finished
    ///
    /// In [`TestMode::Time`] the elapsed time is always `config.count`, otherwise it is
    /// `counted_seconds`.
    pub fn calculate(
        classification: &Classification,
        config: &TestConfig,
        history: &[LiveSample],
        counted_seconds: u32,
    ) -> Self {
        let elapsed_seconds = match config.mode {
            TestMode::Time => f64::from(config.count),
            TestMode::Words => f64::from(counted_seconds),
        };

        let typed = classification.typed();
        let correct_chars = classification.correct();
        let incorrect_chars = classification.incorrect();

        let wpm_history: Vec<f64> = history
            .iter()
            .map(|sample| f64::from(sample.wpm))
            .collect();

        Self {
            wpm: math::wpm(correct_chars, elapsed_seconds),
            raw_wpm: math::wpm(typed, elapsed_seconds),
            accuracy: math::accuracy(correct_chars, incorrect_chars, typed),
            consistency: Consistency::calculate(&wpm_history).percent,
            correct_chars,
            incorrect_chars,
            missed_chars: typed - correct_chars - incorrect_chars,
            elapsed_seconds,
        }
    }

    /// Every character in the input
    pub const fn typed_chars(&self) -> usize {
        self.correct_chars + self.incorrect_chars + self.missed_chars
    }

    pub fn wpm_rounded(&self) -> u32 {
        self.wpm.round() as u32
    }

    pub fn raw_wpm_rounded(&self) -> u32 {
        self.raw_wpm.round() as u32
    }

    pub fn accuracy_rounded(&self) -> u32 {
        self.accuracy.round() as u32
    }

    pub fn consistency_rounded(&self) -> u32 {
        self.consistency.round() as u32
    }
}
