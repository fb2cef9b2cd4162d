//! # External Module - Collaborator Interfaces
//!
//! The engine never fetches text, stores results or draws charts by itself. The
//! host application provides these services through the traits in this module.

use derive_more::From;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{TestConfig, TestMode};

/// Errors while loading source text
///
/// Fetch errors are recoverable. The controller stays in loading and the test can be
/// retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Text source is unavailable: {0}")]
    Unavailable(String),

    #[error("Text source returned malformed output: {0}")]
    Malformed(String),

    #[error("Text source returned no text")]
    Empty,
}

/// Errors while persisting a result
///
/// Save errors are never fatal: they get logged and the displayed result stays as is.
#[derive(Debug, From, Error)]
pub enum SaveError {
    #[error("Failed to write result: {0}")]
    Io(std::io::Error),

    #[error("Failed to encode result: {0}")]
    #[from(skip)]
    Encode(String),

    #[error("Result was rejected: {0}")]
    #[from(skip)]
    Rejected(String),
}

/// Provides the text to type
pub trait TextSource {
    /// Fetch text for the given configuration, blocking until it is available
    fn fetch(&mut self, config: &TestConfig) -> Result<String, FetchError>;

    /// Poll for text without blocking
    ///
    /// Returns `Ok(None)` while the text is still being produced. The default
    /// implementation simply fetches.
    fn try_fetch(&mut self, config: &TestConfig) -> Result<Option<String>, FetchError> {
        self.fetch(config).map(Some)
    }

    /// Abandon any outstanding fetch
    fn cancel(&mut self) {}
}

/// The payload handed to a [`ResultsSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedResult {
    pub wpm: u32,
    /// Percentage between 0 - 100
    pub accuracy: u32,
    pub mode: TestMode,
    pub count: u32,
}

/// Persists finished results
pub trait ResultsSink {
    fn save(&mut self, result: &SavedResult) -> Result<(), SaveError>;
}

/// Draws the per-second series of a finished test
pub trait ChartRenderer {
    /// Draw a new chart. Called once per finished test, after [`ChartRenderer::dispose`].
    fn render(&mut self, wpm: &[u32], raw_wpm: &[u32], errors: &[usize]);

    /// Drop the current chart, if any
    fn dispose(&mut self);
}
