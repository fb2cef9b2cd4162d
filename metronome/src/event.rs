use std::fmt::Display;

use crate::controller::TestState;
use crate::external::FetchError;
use crate::result::FinalResult;

/// The live counter shown while a test runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Seconds left of a time-limited test
    Remaining(u32),
    /// Seconds since the first input of a word-limited test
    Elapsed(u32),
}

impl Counter {
    /// The raw seconds value
    pub const fn seconds(&self) -> u32 {
        match self {
            Self::Remaining(seconds) | Self::Elapsed(seconds) => *seconds,
        }
    }
}

impl Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.seconds())
    }
}

/// Notifications emitted by the [`TestController`](crate::TestController)
///
/// The presentation layer drains these after every call into the controller and
/// reads any further state it needs through the controller's getters.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    StateChanged(TestState),
    /// The input was reclassified; `cursor` is the next position to type
    ClassificationChanged { cursor: usize },
    TickChanged(Counter),
    /// Loading the source text failed. The controller stays in loading until retried.
    FetchFailed(FetchError),
    Finalized(FinalResult),
}
