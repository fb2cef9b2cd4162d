use std::{fs::File, path::Path, sync::Mutex};

use thiserror::Error;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "tapline.log";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log file: {0}")]
    CreateFile(std::io::Error),

    #[error("Failed to install logger: {0}")]
    Install(String),
}

/// Sends logs to a file in `directory`, since the terminal belongs to the UI
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init(directory: &Path, level: &str) -> Result<(), LoggingError> {
    std::fs::create_dir_all(directory).map_err(LoggingError::CreateFile)?;
    let file = File::create(directory.join(LOG_FILE)).map_err(LoggingError::CreateFile)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| LoggingError::Install(error.to_string()))
}
