use std::fs;
use std::path::{Path, PathBuf};

use metronome::{ResultsSink, SaveError, SavedResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use web_time::SystemTime;

const HISTORY_FILE: &str = "results.json";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Failed to create statistics directory: {0}")]
    CreateDirectory(std::io::Error),

    #[error("Failed to read history file: {0}")]
    ReadFile(std::io::Error),

    #[error("Failed to write history file: {0}")]
    WriteFile(std::io::Error),

    #[error("Failed to parse history: {0}")]
    Parse(serde_json::Error),
}

impl From<HistoryError> for SaveError {
    fn from(error: HistoryError) -> Self {
        match error {
            HistoryError::CreateDirectory(error)
            | HistoryError::ReadFile(error)
            | HistoryError::WriteFile(error) => Self::Io(error),
            HistoryError::Parse(error) => Self::Encode(error.to_string()),
        }
    }
}

/// A single saved test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: SystemTime,
    #[serde(flatten)]
    pub result: SavedResult,
}

/// Keeps the newest results in a JSON file
#[derive(Debug)]
pub struct HistoryFile {
    path: PathBuf,
    limit: usize,
}

impl HistoryFile {
    pub fn new(directory: &Path, limit: usize) -> Result<Self, HistoryError> {
        if !directory.exists() {
            fs::create_dir_all(directory).map_err(HistoryError::CreateDirectory)?;
        }
        Ok(Self {
            path: directory.join(HISTORY_FILE),
            limit,
        })
    }

    /// Saved results, oldest first
    pub fn load(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(HistoryError::ReadFile)?;
        serde_json::from_str(&content).map_err(HistoryError::Parse)
    }

    pub fn append(&self, result: SavedResult) -> Result<(), HistoryError> {
        let mut records = self.load()?;
        records.push(HistoryRecord {
            timestamp: SystemTime::now(),
            result,
        });

        // Drop the oldest
        let excess = records.len().saturating_sub(self.limit);
        records.drain(..excess);

        let json = serde_json::to_string_pretty(&records).map_err(HistoryError::Parse)?;
        fs::write(&self.path, json).map_err(HistoryError::WriteFile)?;

        debug!(path = %self.path.display(), records = records.len(), "saved result");
        Ok(())
    }
}

impl ResultsSink for HistoryFile {
    fn save(&mut self, result: &SavedResult) -> Result<(), SaveError> {
        self.append(*result).map_err(SaveError::from)
    }
}

#[cfg(test)]
mod tests {
    use metronome::TestMode;

    use super::*;

    fn result(wpm: u32) -> SavedResult {
        SavedResult {
            wpm,
            accuracy: 95,
            mode: TestMode::Time,
            count: 30,
        }
    }

    #[test]
    fn test_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let history = HistoryFile::new(&nested, 10).unwrap();
        assert!(nested.exists());
        assert!(history.load().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut history = HistoryFile::new(dir.path(), 10).unwrap();

        history.save(&result(40)).unwrap();
        history.save(&result(50)).unwrap();

        let records = history.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].result, result(40));
        assert_eq!(records[1].result, result(50));
    }

    #[test]
    fn test_record_format() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryFile::new(dir.path(), 10).unwrap();
        history.append(result(61)).unwrap();

        let json = fs::read_to_string(dir.path().join(HISTORY_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let record = &value[0];

        assert_eq!(record["wpm"], 61);
        assert_eq!(record["accuracy"], 95);
        assert_eq!(record["mode"], "time");
        assert_eq!(record["count"], 30);
        assert!(record.get("timestamp").is_some());
    }

    #[test]
    fn test_limit_keeps_newest() {
        let dir = tempfile::tempdir().unwrap();
        let history = HistoryFile::new(dir.path(), 2).unwrap();

        for wpm in [10, 20, 30] {
            history.append(result(wpm)).unwrap();
        }

        let wpms: Vec<u32> = history
            .load()
            .unwrap()
            .iter()
            .map(|record| record.result.wpm)
            .collect();
        assert_eq!(wpms, [20, 30]);
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(HISTORY_FILE), "not json").unwrap();

        let mut history = HistoryFile::new(dir.path(), 10).unwrap();
        assert!(matches!(
            history.save(&result(40)),
            Err(SaveError::Encode(_))
        ));
    }
}
