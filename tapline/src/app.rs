use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use metronome::{
    ConfigUpdate, ControllerEvent, Instant, TestConfig, TestController, TestMode, TestState,
    TextRequest,
};
use ratatui::{DefaultTerminal, Frame, style::Stylize, text::ToLine, widgets::Padding};
use tracing::{trace, warn};

use crate::chart::ChartSlot;
use crate::config::Config;
use crate::history::HistoryFile;
use crate::page::{self, Page};
use crate::source::{self, Loader, SourceError};
use crate::utils::{KeyEventHelper, ROUNDED_BLOCK};

/// Longest wait for terminal events between frames
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const TIME_PRESETS: [u32; 4] = [15, 30, 60, 120];
const WORD_PRESETS: [u32; 4] = [10, 30, 50, 100];

/// The counts <F4> cycles through
pub const fn count_presets(mode: TestMode) -> &'static [u32] {
    match mode {
        TestMode::Time => &TIME_PRESETS,
        TestMode::Words => &WORD_PRESETS,
    }
}

/// An app message
#[derive(Debug, PartialEq, Eq)]
pub enum Message {
    /// Text is needed for a new test
    Request(TextRequest),
    /// Quit the application
    Quit,
}

/// The app itself
pub struct App {
    controller: TestController,
    loader: Loader,
    chart: ChartSlot,
    page: Page,
}

impl App {
    /// Creates a new `App` with the source and history described by the config
    pub fn new(config: &Config) -> Result<Self, SourceError> {
        let settings = &config.settings;
        let source = source::from_settings(&settings.source, &config.config_dir)?;
        let chart = ChartSlot::default();

        let mut controller = TestController::new(settings.test)
            .with_configuration(settings.engine.clone())
            .with_chart_renderer(Box::new(chart.clone()));

        if settings.statistic.save_enabled {
            match HistoryFile::new(&config.statistics_dir(), settings.statistic.history_limit) {
                Ok(history) => controller = controller.with_results_sink(Box::new(history)),
                Err(error) => warn!(%error, "results will not be saved"),
            }
        }
        controller.set_authenticated(config.is_authenticated());

        Ok(Self::with_parts(controller, Loader::new(source), chart))
    }

    pub fn with_parts(controller: TestController, loader: Loader, chart: ChartSlot) -> Self {
        Self {
            controller,
            loader,
            chart,
            page: page::Loading.into(),
        }
    }

    /// Runs the app
    pub fn run(&mut self) -> std::io::Result<()> {
        let mut terminal = ratatui::init();
        let result = self.event_loop(&mut terminal);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> std::io::Result<()> {
        let request = self.controller.request_new_test();
        self.loader.request(request);

        loop {
            self.update(Instant::now());
            terminal.draw(|frame| self.draw(frame))?;

            let event = event::poll(self.poll_timeout(Instant::now()))?
                .then(event::read)
                .transpose()?;

            if let Some(Event::Key(key)) = event
                && let Some(message) = self.handle_key(key, Instant::now())
                && self.handle_message(message).is_break()
            {
                break;
            }
        }

        Ok(())
    }

    /// Delivers loaded text, fires due ticks and follows the controller's events
    fn update(&mut self, now: Instant) {
        if let Some((generation, text)) = self.loader.poll() {
            self.controller.on_text_loaded(generation, text);
        }
        self.controller.poll(now);
        self.process_events();
    }

    fn process_events(&mut self) {
        for event in self.controller.drain_events() {
            trace!(?event, "controller event");
            match event {
                ControllerEvent::StateChanged(TestState::Loading) => {
                    self.page = page::Loading.into();
                }
                ControllerEvent::StateChanged(TestState::Ready) => {
                    self.page = page::Typing.into();
                }
                ControllerEvent::FetchFailed(error) => {
                    self.page = page::Error::from(error).into();
                }
                ControllerEvent::Finalized(result) => {
                    let config = *self.controller.config();
                    self.page = page::Results::new(result, config, self.chart.series()).into();
                }
                ControllerEvent::StateChanged(_)
                | ControllerEvent::ClassificationChanged { .. }
                | ControllerEvent::TickChanged(_) => (),
            }
        }
    }

    fn handle_message(&mut self, message: Message) -> std::ops::ControlFlow<()> {
        match message {
            Message::Request(request) => {
                self.loader.request(request);
                std::ops::ControlFlow::Continue(())
            }
            Message::Quit => std::ops::ControlFlow::Break(()),
        }
    }

    /// Wakes up in time for the next tick
    fn poll_timeout(&self, now: Instant) -> Duration {
        self.controller
            .next_tick()
            .map_or(POLL_INTERVAL, |deadline| {
                deadline.saturating_duration_since(now).min(POLL_INTERVAL)
            })
    }

    /// Draws the next frame
    fn draw(&self, frame: &mut Frame) {
        let mut block = ROUNDED_BLOCK
            .padding(Padding::new(1, 1, 0, 0))
            .title_top("TAPLINE".to_line().bold().centered())
            .title_top("<TAB> restart | <CTRL-Q> exit".to_line().right_aligned());

        if let Some(top_msg) = self.page.render_top(&self.controller) {
            block = block.title_top(top_msg);
        }

        let area = frame.area();
        let content = block.inner(area);

        frame.render_widget(block, area);

        self.page.render(frame, content, &self.controller);
    }

    /// Key events
    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Message> {
        if !key.is_press() {
            return None;
        }

        if key.is_ctrl_press_char('q') {
            return Some(Message::Quit);
        }

        let config = self.controller.config();
        let update = match key.code {
            KeyCode::F(1) => Some(ConfigUpdate::TogglePunctuation),
            KeyCode::F(2) => Some(ConfigUpdate::ToggleNumbers),
            KeyCode::F(3) => Some(ConfigUpdate::Mode(match config.mode {
                TestMode::Time => TestMode::Words,
                TestMode::Words => TestMode::Time,
            })),
            KeyCode::F(4) => Some(ConfigUpdate::Count(next_count(config))),
            _ => None,
        };
        if let Some(update) = update {
            return Some(Message::Request(self.controller.configure(update)));
        }

        match key.code {
            KeyCode::Tab | KeyCode::Esc => {
                Some(Message::Request(self.controller.request_new_test()))
            }
            KeyCode::Enter if matches!(self.page, Page::Results(_)) => {
                Some(Message::Request(self.controller.request_new_test()))
            }
            KeyCode::Enter if matches!(self.page, Page::Error(_)) => {
                Some(Message::Request(self.controller.retry()))
            }
            _ if matches!(self.page, Page::Typing(_)) => {
                if let Some(input) = edit_input(self.controller.input(), &key) {
                    self.controller.on_input(&input, now);
                    self.process_events();
                }
                None
            }
            _ => None,
        }
    }
}

/// The count after the current one in the presets of the mode
fn next_count(config: &TestConfig) -> u32 {
    let presets = count_presets(config.mode);
    presets
        .iter()
        .position(|count| *count == config.count)
        .and_then(|index| presets.get(index + 1))
        .or_else(|| presets.first())
        .copied()
        .unwrap_or(config.count)
}

/// The input after applying `key`, or `None` if the key doesn't edit it
fn edit_input(input: &[char], key: &KeyEvent) -> Option<String> {
    let mut input: String = input.iter().collect();

    match key.code {
        KeyCode::Char('w') if key.has_mods(KeyModifiers::CONTROL) => delete_word(&mut input),
        KeyCode::Backspace
            if key.has_mods(KeyModifiers::CONTROL) || key.has_mods(KeyModifiers::ALT) =>
        {
            delete_word(&mut input);
        }
        KeyCode::Backspace => {
            input.pop()?;
        }
        KeyCode::Char(_) if key.has_mods(KeyModifiers::CONTROL) => return None,
        KeyCode::Char(character) => input.push(character),
        _ => return None,
    }

    Some(input)
}

/// Removes the last word, along with the spaces after it
fn delete_word(input: &mut String) {
    let trimmed = input.trim_end_matches(' ');
    let start = trimmed.rfind(' ').map_or(0, |space| space + 1);
    input.truncate(start);
}

#[cfg(test)]
mod tests {
    use metronome::{FetchError, TextSource};

    use super::*;
    use crate::source::WordSource;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(character: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(character), KeyModifiers::CONTROL)
    }

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    /// An app typing "go" `count` times, already past loading
    fn words_app(count: u32) -> (App, Instant) {
        let config = TestConfig {
            mode: TestMode::Words,
            count,
            ..TestConfig::default()
        };
        let chart = ChartSlot::default();
        let controller =
            TestController::new(config).with_chart_renderer(Box::new(chart.clone()));
        let source = WordSource::from_words(vec!["go".to_string()]).unwrap();

        let mut app = App::with_parts(controller, Loader::new(Box::new(source)), chart);
        let request = app.controller.request_new_test();
        app.loader.request(request);

        let now = Instant::now();
        app.update(now);
        (app, now)
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for character in text.chars() {
            assert_eq!(app.handle_key(key(KeyCode::Char(character)), now), None);
        }
    }

    #[test]
    fn test_edit_input() {
        let input = chars("hello wor");

        assert_eq!(
            edit_input(&input, &key(KeyCode::Char('l'))).as_deref(),
            Some("hello worl")
        );
        assert_eq!(
            edit_input(&input, &key(KeyCode::Backspace)).as_deref(),
            Some("hello wo")
        );
        assert_eq!(edit_input(&input, &ctrl('w')).as_deref(), Some("hello "));
        assert_eq!(
            edit_input(&chars("hello  "), &ctrl('w')).as_deref(),
            Some("")
        );
        assert_eq!(edit_input(&input, &ctrl('a')), None);
        assert_eq!(edit_input(&input, &key(KeyCode::Left)), None);
        assert_eq!(edit_input(&[], &key(KeyCode::Backspace)), None);
    }

    #[test]
    fn test_uppercase_is_input() {
        let shifted = KeyEvent::new(KeyCode::Char('H'), KeyModifiers::SHIFT);
        assert_eq!(edit_input(&[], &shifted).as_deref(), Some("H"));
    }

    #[test]
    fn test_next_count() {
        let mut config = TestConfig::default();
        assert_eq!(next_count(&config), 60);

        config.count = 120;
        assert_eq!(next_count(&config), 15);

        config.mode = TestMode::Words;
        config.count = 7;
        assert_eq!(next_count(&config), 10);
    }

    #[test]
    fn test_loads_into_typing() {
        let (app, _) = words_app(2);

        assert!(matches!(app.page, Page::Typing(_)));
        assert_eq!(app.controller.state(), TestState::Ready);
        assert_eq!(app.controller.source_text(), chars("go go"));
    }

    #[test]
    fn test_typing_to_results() {
        let (mut app, now) = words_app(2);

        type_text(&mut app, "go gx", now);
        assert_eq!(app.controller.state(), TestState::Running);

        app.handle_key(key(KeyCode::Backspace), now);
        type_text(&mut app, "o", now);

        assert_eq!(app.controller.state(), TestState::Finished);
        assert!(matches!(app.page, Page::Results(_)));
    }

    #[test]
    fn test_results_enter_starts_next_test() {
        let (mut app, now) = words_app(1);
        type_text(&mut app, "go", now);
        let generation = app.controller.generation();

        assert!(matches!(
            app.handle_key(key(KeyCode::Enter), now),
            Some(Message::Request(request)) if request.generation == generation + 1
        ));
        app.process_events();
        assert!(matches!(app.page, Page::Loading(_)));
    }

    #[test]
    fn test_config_keys_request_text() {
        let (mut app, now) = words_app(3);

        let Some(Message::Request(request)) = app.handle_key(key(KeyCode::F(1)), now) else {
            panic!("expected a text request");
        };
        assert!(request.config.punctuation);

        let Some(Message::Request(request)) = app.handle_key(key(KeyCode::F(3)), now) else {
            panic!("expected a text request");
        };
        assert_eq!(request.config.mode, TestMode::Time);
        assert_eq!(request.config.count, 30);

        let Some(Message::Request(request)) = app.handle_key(key(KeyCode::F(4)), now) else {
            panic!("expected a text request");
        };
        assert_eq!(request.config.count, 60);
    }

    #[test]
    fn test_quit() {
        let (mut app, now) = words_app(1);
        assert_eq!(app.handle_key(ctrl('q'), now), Some(Message::Quit));
        assert!(app.handle_message(Message::Quit).is_break());
    }

    struct Unavailable;

    impl TextSource for Unavailable {
        fn fetch(&mut self, _config: &TestConfig) -> Result<String, FetchError> {
            Err(FetchError::Unavailable("offline".to_string()))
        }
    }

    #[test]
    fn test_fetch_failure_and_retry() {
        let chart = ChartSlot::default();
        let controller = TestController::new(TestConfig::default());
        let mut app = App::with_parts(controller, Loader::new(Box::new(Unavailable)), chart);
        let now = Instant::now();

        let request = app.controller.request_new_test();
        app.loader.request(request);
        app.update(now);

        assert!(matches!(app.page, Page::Error(_)));
        assert_eq!(app.controller.state(), TestState::Loading);

        // Typing does nothing on the error page
        assert_eq!(app.handle_key(key(KeyCode::Char('a')), now), None);

        let Some(Message::Request(retry)) = app.handle_key(key(KeyCode::Enter), now) else {
            panic!("expected a retry");
        };
        assert_eq!(retry.generation, request.generation + 1);
    }

    #[test]
    fn test_poll_timeout() {
        let (mut app, now) = words_app(3);
        assert_eq!(app.poll_timeout(now), POLL_INTERVAL);

        type_text(&mut app, "g", now);
        assert_eq!(app.poll_timeout(now), POLL_INTERVAL);
        assert_eq!(
            app.poll_timeout(now + Duration::from_millis(980)),
            Duration::from_millis(20)
        );
    }
}
