//! # Configuration Module - Test Setup and Engine Behavior
//!
//! Two kinds of configuration live here:
//!
//! - [`TestConfig`] describes *which* test is taken (mode, target count and the
//!   punctuation/number toggles). It is frozen for the duration of one test and
//!   only changes between tests through [`ConfigUpdate`].
//! - [`Configuration`] tunes *how* the engine behaves, independent of the test
//!   being taken.
//!
//! ## Usage
//!
//! ```rust
//! use metronome::config::{ConfigUpdate, TestConfig, TestMode};
//!
//! let mut config = TestConfig::default();
//! assert_eq!(config.mode, TestMode::Time);
//!
//! config.apply(ConfigUpdate::Mode(TestMode::Words));
//! config.apply(ConfigUpdate::Count(50));
//! assert_eq!(config.count, 50);
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Count used for either mode right after switching to it
pub const DEFAULT_COUNT: u32 = 30;

/// How a test terminates
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum TestMode {
    /// The test runs for `count` seconds
    #[default]
    Time,
    /// The test runs until all `count` words are typed correctly
    Words,
}

/// The test being taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestConfig {
    pub punctuation: bool,
    pub numbers: bool,
    pub mode: TestMode,
    /// Seconds in [`TestMode::Time`], words in [`TestMode::Words`]
    pub count: u32,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            punctuation: false,
            numbers: false,
            mode: TestMode::Time,
            count: DEFAULT_COUNT,
        }
    }
}

/// A single change to a [`TestConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpdate {
    TogglePunctuation,
    ToggleNumbers,
    /// Switches mode and resets `count` to [`DEFAULT_COUNT`]
    Mode(TestMode),
    Count(u32),
}

impl TestConfig {
    /// Merge an update into the configuration
    pub fn apply(&mut self, update: ConfigUpdate) {
        match update {
            ConfigUpdate::TogglePunctuation => self.punctuation = !self.punctuation,
            ConfigUpdate::ToggleNumbers => self.numbers = !self.numbers,
            ConfigUpdate::Mode(mode) => {
                self.mode = mode;
                self.count = DEFAULT_COUNT;
            }
            ConfigUpdate::Count(count) => self.count = count,
        }
    }

    /// The configuration as key/value query parameters for a text source
    ///
    /// Keys are `mode`, `count`, `punctuation` and `numbers`; booleans are written as
    /// lower-case `true`/`false`.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("mode", self.mode.to_string()),
            ("count", self.count.to_string()),
            ("punctuation", self.punctuation.to_string()),
            ("numbers", self.numbers.to_string()),
        ]
    }
}

/// What happens to characters typed past the end of the source text
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep them in the input and report them as missed characters
    #[default]
    Exclude,
    /// Truncate the input to the length of the source text
    Reject,
}

/// Runtime configuration for the engine
///
/// All settings have defaults matching a standard typing test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Handling of input that runs past the source text
    ///
    /// **Default**: [`OverflowPolicy::Exclude`]
    pub overflow: OverflowPolicy,
}
