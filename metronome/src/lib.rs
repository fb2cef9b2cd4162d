//! # Metronome - A Typing-Test Engine
//!
//! Metronome drives a single typing-speed test from start to finish: it owns the
//! configuration, the source text and the user's input, classifies every
//! position of the source text against that input, samples live speed once per
//! second and computes the final result when the test terminates.
//!
//! Rendering, text fetching and result persistence are left to the host
//! application. The engine talks to them through the traits in [`external`]
//! and through the [`ControllerEvent`] queue.
//!
//! ## Lifecycle
//!
#![doc = simple_mermaid::mermaid!("../diagrams/controller_lifecycle.mmd")]
//!
//! ## Usage
//!
//! ```rust
//! use metronome::{Instant, Duration, TestConfig, TestController, TestMode, TestState};
//!
//! let config = TestConfig { mode: TestMode::Words, count: 3, ..TestConfig::default() };
//! let mut controller = TestController::new(config);
//!
//! let request = controller.request_new_test();
//! controller.on_text_loaded(request.generation, Ok("the cat sat".to_string()));
//!
//! let start = Instant::now();
//! controller.on_input("t", start);
//! controller.poll(start + Duration::from_secs(6));
//! controller.on_input("the cat sat", start + Duration::from_millis(6_200));
//!
//! assert_eq!(controller.state(), TestState::Finished);
//! let result = controller.result().unwrap();
//! assert_eq!(result.wpm.round(), 22.0);
//! assert_eq!(result.accuracy, 100.0);
//! ```

pub mod config;
pub mod controller;
pub mod diff;
pub mod event;
pub mod external;
pub mod math;
pub mod recorder;
pub mod result;
pub mod ticker;

pub use config::{ConfigUpdate, Configuration, OverflowPolicy, TestConfig, TestMode};
pub use controller::{TestController, TestState, TextRequest};
pub use diff::{CharClass, Classification};
pub use event::{ControllerEvent, Counter};
pub use external::{ChartRenderer, FetchError, ResultsSink, SaveError, SavedResult, TextSource};
pub use recorder::{LiveSample, StatsRecorder};
pub use result::FinalResult;
pub use web_time::{Duration, Instant};

/// Characters per "word" in every WPM formula
pub const AVERAGE_WORD_LENGTH: usize = 5;

// Types for more general type-safety
type Seconds = f64;
type Minutes = f64;

// Get the minutes elapsed from a timestamp
pub(crate) fn minutes(seconds: Seconds) -> Minutes {
    seconds / 60.0
}
