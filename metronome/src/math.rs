//! Formulas shared by the live sampler and the final result.
//!
//! All functions return unrounded values. Rounding happens at the presentation
//! boundary only.

use crate::{AVERAGE_WORD_LENGTH, Seconds, minutes};

/// Words Per Minute
///
/// * `characters` - How many characters count towards the speed
/// * `seconds` - How many seconds have gone by
///
/// Returns `0.0` if no time has passed.
pub fn wpm(characters: usize, seconds: Seconds) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }

    (characters as f64 / AVERAGE_WORD_LENGTH as f64) / minutes(seconds)
}

/// Typing accuracy as a percentage between 0.0 - 100.0
///
/// * `correct` - Correctly typed characters
/// * `incorrect` - Incorrectly typed characters
/// * `typed` - Every typed character, including any past the end of the text
///
/// Nothing typed means an accuracy of `0.0`.
pub fn accuracy(correct: usize, incorrect: usize, typed: usize) -> f64 {
    let classified = correct + incorrect;
    if typed == 0 || classified == 0 {
        return 0.0;
    }

    (correct as f64 / classified as f64) * 100.0
}

/// Typing consistency
///
/// Consistency describes the stability of typing speed over time, based on the
/// coefficient of variation of the sampled WPM values.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Consistency {
    /// Arithmetic mean of the samples
    pub mean: f64,
    /// Population standard deviation of the samples
    pub deviation: f64,
    /// Consistency as percentage (0.0 - 100.0)
    pub percent: f64,
}

impl Consistency {
    /// Calculate consistency from a series of WPM samples
    pub fn calculate(values: &[f64]) -> Self {
        let mean = mean(values);
        let deviation = std_dev(values);

        let percent = if mean <= 0.0 {
            0.0
        } else {
            ((1.0 - deviation / mean) * 100.0).max(0.0)
        };

        Self {
            mean,
            deviation,
            percent,
        }
    }
}

/// Arithmetic mean, `0.0` for an empty series
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Population standard deviation, `0.0` for fewer than two values
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    // Welford's online algorithm
    let mut mean = 0.0;
    let mut m2 = 0.0;

    for (i, &value) in values.iter().enumerate() {
        let delta = value - mean;
        mean += delta / (i + 1) as f64;
        let delta2 = value - mean;
        m2 += delta * delta2;
    }

    (m2 / values.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_wpm() {
        // 11 characters in 6 seconds
        assert_close(wpm(11, 6.0), 22.0);
        // 135 characters in 30 seconds
        assert_close(wpm(135, 30.0), 54.0);
        assert_eq!(wpm(100, 0.0), 0.0);
        assert_eq!(wpm(100, -1.0), 0.0);
        assert_eq!(wpm(0, 10.0), 0.0);
    }

    #[test]
    fn test_accuracy() {
        assert_close(accuracy(135, 15, 150), 90.0);
        assert_close(accuracy(11, 0, 11), 100.0);
        assert_eq!(accuracy(0, 0, 0), 0.0);
        assert_eq!(accuracy(0, 5, 5), 0.0);
        // Overflow characters don't count against accuracy
        assert_close(accuracy(3, 1, 6), 75.0);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[42.0]), 0.0);
        assert_close(std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 2.0);
    }

    #[test]
    fn test_consistency() {
        let consistency = Consistency::calculate(&[40.0, 42.0, 41.0, 39.0]);
        assert_close(consistency.mean, 40.5);
        assert_close(consistency.deviation, 1.25f64.sqrt());
        assert!(consistency.percent > 96.0 && consistency.percent < 98.0);
        assert_eq!(consistency.percent.round(), 97.0);
    }

    #[test]
    fn test_consistency_edge_cases() {
        assert_eq!(Consistency::calculate(&[]).percent, 0.0);
        assert_eq!(Consistency::calculate(&[0.0, 0.0]).percent, 0.0);
        assert_close(Consistency::calculate(&[50.0]).percent, 100.0);

        // Wild swings bottom out at zero
        let consistency = Consistency::calculate(&[0.0, 0.0, 0.0, 200.0]);
        assert_eq!(consistency.percent, 0.0);
    }
}
