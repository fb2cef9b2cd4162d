//! # Controller Module - Typing Test Lifecycle
//!
//! The [`TestController`] is the single owner of all per-test state: the
//! configuration, the source text, the input, the classification, the metrics
//! history and the tick schedule. Every transition happens synchronously inside
//! one of its methods, so no locking is needed.
//!
//! ## States
//!
//! - **Idle**: nothing requested yet
//! - **Loading**: waiting for source text of the current generation
//! - **Ready**: text loaded, timing starts on the first input
//! - **Running**: the tick source is armed
//! - **Finished**: the result is frozen until the next request
//!
//! ## Ticks
//!
//! A single [`Ticker`] drives both the elapsed-time counter and the sampler, so
//! sample `n` is always taken exactly `n` seconds after the first input. The host
//! calls [`TestController::poll`] with the current time as often as it likes.
//!
//! ## Stale text
//!
//! Every call to [`TestController::request_new_test`] bumps a generation counter.
//! Text arriving for an older generation is dropped.

use std::collections::VecDeque;
use std::fmt::Debug;

use thiserror::Error;
use tracing::{debug, error, info, trace, warn};
use web_time::Instant;

use crate::config::{ConfigUpdate, Configuration, OverflowPolicy, TestConfig, TestMode};
use crate::diff::Classification;
use crate::event::{ControllerEvent, Counter};
use crate::external::{ChartRenderer, FetchError, ResultsSink, SavedResult};
use crate::recorder::{LiveSample, StatsRecorder};
use crate::result::FinalResult;
use crate::ticker::{TICK_PERIOD, Ticker};

/// Lifecycle state of the current test
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestState {
    #[default]
    Idle,
    Loading,
    /// Text is loaded and the test starts with the first input
    Ready,
    Running,
    Finished,
}

/// A request for source text, tagged with the generation it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRequest {
    pub generation: u64,
    pub config: TestConfig,
}

/// Programming errors in the way the controller is driven
///
/// These fail fast in debug builds and are logged and ignored in release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("tick delivered while no test was requested")]
    TickWhileIdle,

    #[error("classification requested without source text")]
    NoSourceText,
}

/// Orchestrates a typing test from request to result
pub struct TestController {
    config: TestConfig,
    settings: Configuration,
    state: TestState,
    generation: u64,

    source: Vec<char>,
    input: Vec<char>,
    classification: Classification,

    recorder: StatsRecorder,
    ticker: Option<Ticker>,
    counter: Counter,
    result: Option<FinalResult>,
    last_fetch_error: Option<FetchError>,

    events: VecDeque<ControllerEvent>,

    authenticated: bool,
    sink: Option<Box<dyn ResultsSink>>,
    chart: Option<Box<dyn ChartRenderer>>,
}

impl Debug for TestController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestController")
            .field("config", &self.config)
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("source_len", &self.source.len())
            .field("input_len", &self.input.len())
            .field("counter", &self.counter)
            .field("samples", &self.recorder.history().len())
            .field("authenticated", &self.authenticated)
            .finish_non_exhaustive()
    }
}

impl TestController {
    /// Create an idle controller for the given test configuration
    pub fn new(config: TestConfig) -> Self {
        Self {
            config,
            settings: Configuration::default(),
            state: TestState::Idle,
            generation: 0,
            source: Vec::new(),
            input: Vec::new(),
            classification: Classification::default(),
            recorder: StatsRecorder::new(),
            ticker: None,
            counter: initial_counter(&config),
            result: None,
            last_fetch_error: None,
            events: VecDeque::new(),
            authenticated: false,
            sink: None,
            chart: None,
        }
    }

    /// Configure the engine with custom settings (builder pattern)
    pub fn with_configuration(mut self, settings: Configuration) -> Self {
        self.settings = settings;
        self
    }

    /// Attach the sink finished results are saved to
    pub fn with_results_sink(mut self, sink: Box<dyn ResultsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Attach the renderer for the per-second chart
    pub fn with_chart_renderer(mut self, chart: Box<dyn ChartRenderer>) -> Self {
        self.chart = Some(chart);
        self
    }

    /// Results are only saved while authenticated
    pub const fn set_authenticated(&mut self, authenticated: bool) {
        self.authenticated = authenticated;
    }

    /// Merge a configuration change and start over with a new test
    pub fn configure(&mut self, update: ConfigUpdate) -> TextRequest {
        self.config.apply(update);
        debug!(?update, config = ?self.config, "configuration changed");
        self.request_new_test()
    }

    /// Throw away the current test and request text for a new one
    ///
    /// The returned request must be resolved through [`TestController::on_text_loaded`].
    pub fn request_new_test(&mut self) -> TextRequest {
        self.stop_timers();

        if let Some(chart) = self.chart.as_mut() {
            chart.dispose();
        }

        self.generation += 1;
        self.source.clear();
        self.input.clear();
        self.classification = Classification::default();
        self.recorder.reset();
        self.counter = initial_counter(&self.config);
        self.result = None;
        self.last_fetch_error = None;

        info!(generation = self.generation, config = ?self.config, "new test requested");
        self.transition(TestState::Loading);

        TextRequest {
            generation: self.generation,
            config: self.config,
        }
    }

    /// Re-issue the text request after a failed fetch
    pub fn retry(&mut self) -> TextRequest {
        debug!(error = ?self.last_fetch_error, "retrying text request");
        self.request_new_test()
    }

    /// Deliver the outcome of a text request
    ///
    /// Returns false if the outcome was discarded because it belongs to an older
    /// request, or because no text is expected right now.
    pub fn on_text_loaded(&mut self, generation: u64, text: Result<String, FetchError>) -> bool {
        if generation != self.generation || self.state != TestState::Loading {
            debug!(
                generation,
                current = self.generation,
                state = ?self.state,
                "discarding stale text"
            );
            return false;
        }

        let text = text.and_then(|text| {
            if text.is_empty() {
                Err(FetchError::Empty)
            } else {
                Ok(text)
            }
        });

        match text {
            Ok(text) => {
                self.source = text.chars().collect();
                self.classification = Classification::untyped(self.source.len());
                self.counter = initial_counter(&self.config);

                info!(generation, chars = self.source.len(), "text loaded");
                self.transition(TestState::Ready);
                self.events.push_back(ControllerEvent::ClassificationChanged { cursor: 0 });
                self.events.push_back(ControllerEvent::TickChanged(self.counter));
            }
            Err(error) => {
                warn!(generation, %error, "failed to load text");
                self.last_fetch_error = Some(error.clone());
                self.events.push_back(ControllerEvent::FetchFailed(error));
            }
        }

        true
    }

    /// Replace the input with `input` and reclassify it
    ///
    /// The first input of a test starts the tick source. Input is ignored unless the
    /// test is ready or running.
    pub fn on_input(&mut self, input: &str, now: Instant) {
        // Ticks that are already due happened before this input
        self.poll(now);

        match self.state {
            TestState::Ready => self.start(now),
            TestState::Running => (),
            state => {
                trace!(?state, "ignoring input");
                return;
            }
        }

        self.input = input.chars().collect();
        if self.settings.overflow == OverflowPolicy::Reject {
            self.input.truncate(self.source.len());
        }

        self.reclassify();

        if self.config.mode == TestMode::Words && self.classification.is_complete() {
            self.finalize();
        }
    }

    /// Fire every tick that is due at `now`
    ///
    /// Returns the amount of ticks fired.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut fired = 0;

        while self.state == TestState::Running {
            let Some(deadline) = self.ticker.as_mut().and_then(|ticker| ticker.due(now)) else {
                break;
            };
            self.on_tick(deadline);
            fired += 1;
        }

        fired
    }

    /// Advance the elapsed-time counter and take a sample
    ///
    /// In [`TestMode::Time`] the counter counts down and the test finishes when it
    /// reaches zero. In [`TestMode::Words`] it counts up.
    pub fn on_tick(&mut self, now: Instant) {
        match self.state {
            TestState::Running => (),
            TestState::Idle => {
                self.invariant_violation(InvariantViolation::TickWhileIdle);
                return;
            }
            state => {
                trace!(?state, "ignoring tick");
                return;
            }
        }

        self.counter = match self.counter {
            Counter::Remaining(seconds) => Counter::Remaining(seconds.saturating_sub(1)),
            Counter::Elapsed(seconds) => Counter::Elapsed(seconds + 1),
        };
        self.events.push_back(ControllerEvent::TickChanged(self.counter));

        self.on_sample_tick(now);

        if self.counter == Counter::Remaining(0) {
            self.finalize();
        }
    }

    /// Record a live sample of the current input
    pub fn on_sample_tick(&mut self, now: Instant) -> Option<LiveSample> {
        if self.state != TestState::Running {
            trace!(state = ?self.state, "ignoring sample tick");
            return None;
        }

        let sample = self.recorder.sample(now, &self.classification);
        if let Some(sample) = &sample {
            trace!(?sample, "sampled");
        }
        sample
    }

    /// Stop the test and compute its result
    ///
    /// Returns `None` if the test isn't running. The result is computed once and
    /// handed to the chart renderer and, when authenticated, the results sink.
    pub fn finalize(&mut self) -> Option<FinalResult> {
        if self.state != TestState::Running {
            debug!(state = ?self.state, "finalize ignored, test is not running");
            return None;
        }

        self.stop_timers();

        let result = FinalResult::calculate(
            &self.classification,
            &self.config,
            self.recorder.history(),
            self.counter.seconds(),
        );
        self.result = Some(result);

        info!(
            wpm = result.wpm,
            accuracy = result.accuracy,
            consistency = result.consistency,
            "test finished"
        );
        self.transition(TestState::Finished);
        self.events.push_back(ControllerEvent::Finalized(result));

        if let Some(chart) = self.chart.as_mut() {
            chart.dispose();
            chart.render(
                &self.recorder.wpm_series(),
                &self.recorder.raw_wpm_series(),
                &self.recorder.error_series(),
            );
        }

        if self.authenticated
            && let Some(sink) = self.sink.as_mut()
        {
            let saved = SavedResult {
                wpm: result.wpm_rounded(),
                accuracy: result.accuracy_rounded(),
                mode: self.config.mode,
                count: self.config.count,
            };
            if let Err(error) = sink.save(&saved) {
                warn!(%error, "failed to save result");
            }
        }

        Some(result)
    }

    /// Take every event queued since the last call
    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain(..).collect()
    }

    pub const fn state(&self) -> TestState {
        self.state
    }

    pub const fn config(&self) -> &TestConfig {
        &self.config
    }

    pub const fn settings(&self) -> &Configuration {
        &self.settings
    }

    /// Generation of the most recent text request
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source_text(&self) -> &[char] {
        &self.source
    }

    pub fn input(&self) -> &[char] {
        &self.input
    }

    pub const fn classification(&self) -> &Classification {
        &self.classification
    }

    /// The live counter value
    pub const fn counter(&self) -> Counter {
        self.counter
    }

    /// Whitespace-separated words in the input
    pub fn words_typed(&self) -> usize {
        self.input
            .iter()
            .collect::<String>()
            .split_whitespace()
            .count()
    }

    pub fn history(&self) -> &[LiveSample] {
        self.recorder.history()
    }

    /// The result of the finished test
    pub const fn result(&self) -> Option<&FinalResult> {
        self.result.as_ref()
    }

    pub const fn last_fetch_error(&self) -> Option<&FetchError> {
        self.last_fetch_error.as_ref()
    }

    /// Returns true while the tick source is armed
    pub const fn is_timing(&self) -> bool {
        self.ticker.is_some()
    }

    /// The instant the next tick is due, if a test is running
    pub fn next_tick(&self) -> Option<Instant> {
        self.ticker.as_ref().map(Ticker::next_deadline)
    }

    fn start(&mut self, now: Instant) {
        self.recorder.start(now);
        self.ticker = Some(Ticker::start(now, TICK_PERIOD));
        debug!("timing started");
        self.transition(TestState::Running);
    }

    fn stop_timers(&mut self) {
        if self.ticker.take().is_some() {
            debug!("timing stopped");
        }
    }

    fn reclassify(&mut self) {
        if self.source.is_empty() {
            self.invariant_violation(InvariantViolation::NoSourceText);
            return;
        }

        self.classification = Classification::compute(&self.source, &self.input);
        self.events.push_back(ControllerEvent::ClassificationChanged {
            cursor: self.classification.cursor(),
        });
    }

    fn transition(&mut self, state: TestState) {
        debug!(from = ?self.state, to = ?state, "state changed");
        self.state = state;
        self.events.push_back(ControllerEvent::StateChanged(state));
    }

    fn invariant_violation(&self, violation: InvariantViolation) {
        error!(%violation, state = ?self.state, "invariant violation");
        debug_assert!(false, "invariant violation: {violation}");
    }
}

const fn initial_counter(config: &TestConfig) -> Counter {
    match config.mode {
        TestMode::Time => Counter::Remaining(config.count),
        TestMode::Words => Counter::Elapsed(0),
    }
}
