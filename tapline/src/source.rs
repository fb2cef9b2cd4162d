use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread::JoinHandle,
    time::Duration,
};

use derive_more::From;
use metronome::{FetchError, TestConfig, TestMode, TextRequest, TextSource};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SourceSettings;

const ENGLISH: &str = include_str!("../assets/english.txt");

/// Words generated for a time-limited test
const TIME_MODE_WORDS: usize = 250;

const PUNCTUATION: [char; 6] = ['.', ',', ';', ':', '?', '!'];

const PUNCTUATION_CHANCE: f64 = 0.15;

const NUMBERS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error, From)]
pub enum SourceError {
    #[error("Unable to find '{tool}' in path: {error}")]
    ToolMissing { tool: String, error: which::Error },

    #[error("Source command is empty")]
    #[from(skip)]
    EmptyCommand,

    #[error("Failed to read word list '{path}': {error}")]
    ReadWordList { path: PathBuf, error: std::io::Error },

    #[error("Word list contains no words")]
    #[from(skip)]
    EmptyWordList,
}

/// Creates the text source described by the settings
pub fn from_settings(
    settings: &SourceSettings,
    working_dir: &Path,
) -> Result<Box<dyn TextSource>, SourceError> {
    let source: Box<dyn TextSource> = match settings {
        SourceSettings::Words { word_list: None } => Box::new(WordSource::english()),
        SourceSettings::Words {
            word_list: Some(path),
        } => Box::new(WordSource::from_file(&working_dir.join(path))?),
        SourceSettings::Command {
            command,
            required_tools,
        } => Box::new(CommandSource::new(
            command.clone(),
            required_tools,
            working_dir.to_path_buf(),
        )?),
    };
    Ok(source)
}

/// Random words from a word list
#[derive(Debug)]
pub struct WordSource {
    words: Vec<String>,
    rng: StdRng,
}

impl WordSource {
    /// Creates a source from the built-in english word list
    pub fn english() -> Self {
        Self {
            words: parse_words(ENGLISH),
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a source from a file with one word per line
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        let contents = std::fs::read_to_string(path).map_err(|error| SourceError::ReadWordList {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_words(parse_words(&contents))
    }

    pub fn from_words(words: Vec<String>) -> Result<Self, SourceError> {
        if words.is_empty() {
            return Err(SourceError::EmptyWordList);
        }
        Ok(Self {
            words,
            rng: StdRng::from_entropy(),
        })
    }

    /// Use a fixed seed for reproducible text
    #[cfg(test)]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Generates a single-space separated string of words for the config
    pub fn generate(&mut self, config: &TestConfig) -> String {
        let mut pool: Vec<&str> = self.words.iter().map(String::as_str).collect();
        if config.numbers {
            pool.extend(NUMBERS);
        }

        let amount = match config.mode {
            TestMode::Time => TIME_MODE_WORDS,
            TestMode::Words => config.count as usize,
        };

        let mut words: Vec<String> = (0..amount)
            .filter_map(|_| pool.choose(&mut self.rng).map(|word| (*word).to_string()))
            .collect();

        if config.punctuation {
            // The mark goes on the word before, so the last word never gets one
            for index in 1..words.len() {
                let previous = &mut words[index - 1];
                if self.rng.gen_bool(PUNCTUATION_CHANCE)
                    && !previous.ends_with(PUNCTUATION)
                    && let Some(mark) = PUNCTUATION.choose(&mut self.rng)
                {
                    previous.push(*mark);
                }
            }
        }

        words.join(" ")
    }
}

impl TextSource for WordSource {
    fn fetch(&mut self, config: &TestConfig) -> Result<String, FetchError> {
        let text = self.generate(config);
        if text.is_empty() {
            return Err(FetchError::Empty);
        }
        Ok(text)
    }
}

fn parse_words(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

type PipeReader = JoinHandle<std::io::Result<Vec<u8>>>;

/// A spawned source command, with its output read on separate threads
///
/// Reading while the command runs keeps it from blocking on a full pipe.
#[derive(Debug)]
struct RunningCommand {
    child: Child,
    status: Option<ExitStatus>,
    stdout: PipeReader,
    stderr: PipeReader,
}

impl RunningCommand {
    fn spawn(mut command: Command) -> std::io::Result<Self> {
        let mut child = command.spawn()?;
        let stdout = read_pipe(child.stdout.take());
        let stderr = read_pipe(child.stderr.take());
        Ok(Self {
            child,
            status: None,
            stdout,
            stderr,
        })
    }

    /// Returns true once the command exited and all of its output is read
    fn is_finished(&mut self) -> std::io::Result<bool> {
        if self.status.is_none() {
            self.status = self.child.try_wait()?;
        }
        Ok(self.status.is_some() && self.stdout.is_finished() && self.stderr.is_finished())
    }
}

fn read_pipe<R: Read + Send + 'static>(pipe: Option<R>) -> PipeReader {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buffer)?;
        }
        Ok(buffer)
    })
}

fn join_pipe(reader: PipeReader) -> Result<Vec<u8>, FetchError> {
    reader
        .join()
        .map_err(|_| FetchError::Unavailable("Failed to read source output".to_string()))?
        .map_err(|error| FetchError::Unavailable(error.to_string()))
}

/// Text from the output of an external command
///
/// The command is spawned on the first poll and checked without blocking afterwards.
#[derive(Debug)]
pub struct CommandSource {
    program: Vec<String>,
    working_dir: PathBuf,
    running: Option<RunningCommand>,
}

impl CommandSource {
    pub fn new(
        program: Vec<String>,
        required_tools: &[String],
        working_dir: PathBuf,
    ) -> Result<Self, SourceError> {
        if program.is_empty() {
            return Err(SourceError::EmptyCommand);
        }

        // Ensure required tools exist in path
        required_tools.iter().try_for_each(|tool| {
            which::which(tool)
                .map(|_| ())
                .map_err(|error| (tool.clone(), error))
        })?;

        Ok(Self {
            program,
            working_dir,
            running: None,
        })
    }

    fn command(&self, config: &TestConfig) -> Command {
        let pairs = config.query_pairs();
        let mut program = self
            .program
            .iter()
            .map(|arg| replace_placeholders(arg, &pairs));

        // `new` rejects empty programs
        let mut command = Command::new(program.next().unwrap_or_default());
        command
            .args(program)
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl TextSource for CommandSource {
    fn fetch(&mut self, config: &TestConfig) -> Result<String, FetchError> {
        loop {
            if let Some(text) = self.try_fetch(config)? {
                return Ok(text);
            }
            std::thread::sleep(COMMAND_POLL_INTERVAL);
        }
    }

    fn try_fetch(&mut self, config: &TestConfig) -> Result<Option<String>, FetchError> {
        // Take the running command out
        let Some(mut running) = self.running.take() else {
            let running = RunningCommand::spawn(self.command(config))
                .map_err(|error| FetchError::Unavailable(error.to_string()))?;
            debug!(pid = running.child.id(), "spawned source command");
            self.running = Some(running);
            return Ok(None);
        };

        let finished = running.is_finished();
        // Put the running command back
        self.running = Some(running);
        match finished {
            Ok(true) => (),
            Ok(false) => return Ok(None),
            Err(error) => {
                self.cancel();
                return Err(FetchError::Unavailable(error.to_string()));
            }
        }

        let Some(RunningCommand {
            status: Some(status),
            stdout,
            stderr,
            ..
        }) = self.running.take()
        else {
            return Ok(None);
        };

        let stderr = join_pipe(stderr)?;
        let stderr = String::from_utf8_lossy(&stderr);
        let stdout = String::from_utf8(join_pipe(stdout)?)
            .map_err(|error| FetchError::Malformed(error.to_string()))?;

        if !status.success() {
            return Err(FetchError::Unavailable(format!(
                "Source process returned bad exit code: {status}\nStderr: {stderr}"
            )));
        }

        let text = stdout.split_whitespace().collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            return Err(FetchError::Empty);
        }

        Ok(Some(text))
    }

    fn cancel(&mut self) {
        // The output readers stop on their own once the pipes close
        if let Some(mut running) = self.running.take()
            && running.status.is_none()
        {
            if let Err(error) = running.child.kill() {
                warn!(%error, "failed to kill source command");
            }
            // Reap the process
            let _ = running.child.wait();
        }
    }
}

impl Drop for CommandSource {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Replaces `{key}` with its value for every pair
fn replace_placeholders(arg: &str, pairs: &[(&'static str, String)]) -> String {
    pairs.iter().fold(arg.to_string(), |arg, (key, value)| {
        arg.replace(&format!("{{{key}}}"), value)
    })
}

/// Polls a [`TextSource`] for the newest [`TextRequest`]
///
/// Only one request is outstanding at a time. A new request cancels the previous one, and
/// every delivered text carries the generation it was requested for.
pub struct Loader {
    source: Box<dyn TextSource>,
    pending: Option<TextRequest>,
}

impl Loader {
    pub fn new(source: Box<dyn TextSource>) -> Self {
        Self {
            source,
            pending: None,
        }
    }

    pub fn request(&mut self, request: TextRequest) {
        if let Some(previous) = self.pending.replace(request) {
            debug!(generation = previous.generation, "cancelling text request");
            self.source.cancel();
        }
    }

    /// Returns the generation and outcome of the pending request once it resolves
    pub fn poll(&mut self) -> Option<(u64, Result<String, FetchError>)> {
        let request = self.pending?;
        let outcome = match self.source.try_fetch(&request.config) {
            Ok(None) => return None,
            Ok(Some(text)) => Ok(text),
            Err(error) => Err(error),
        };
        self.pending = None;
        Some((request.generation, outcome))
    }
}
