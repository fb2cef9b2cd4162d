use std::path::PathBuf;

use clap::Parser;
use metronome::{ConfigUpdate, TestConfig, TestMode};
use tracing::info;

use crate::app::App;
use crate::config::Config;

mod app;
mod chart;
mod config;
mod history;
mod logging;
mod page;
mod source;
mod utils;

/// A typing test for your terminal
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory containing `settings.toml`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Test mode, `time` or `words`
    #[arg(short, long)]
    mode: Option<TestMode>,

    /// Seconds in time mode, words in words mode
    #[arg(short = 'n', long)]
    count: Option<u32>,

    /// Sprinkle punctuation into the text
    #[arg(short, long)]
    punctuation: bool,

    /// Mix numbers into the text
    #[arg(long)]
    numbers: bool,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

impl Cli {
    /// Command line flags override the configured test
    fn apply(&self, test: &mut TestConfig) {
        if let Some(mode) = self.mode {
            test.apply(ConfigUpdate::Mode(mode));
        }
        if let Some(count) = self.count {
            test.apply(ConfigUpdate::Count(count));
        }
        if self.punctuation && !test.punctuation {
            test.apply(ConfigUpdate::TogglePunctuation);
        }
        if self.numbers && !test.numbers {
            test.apply(ConfigUpdate::ToggleNumbers);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = Config::get(cli.config.clone())?;
    cli.apply(&mut config.settings.test);

    if cli.dump_config {
        print!("{}", config.settings.to_toml()?);
        return Ok(());
    }

    if let Err(error) = logging::init(&config.data_dir, &config.settings.log_level) {
        eprintln!("{error}. Continuing without logs");
    }

    info!(
        config_dir = %config.config_dir.display(),
        test = ?config.settings.test,
        "starting"
    );

    App::new(&config)?.run()?;

    Ok(())
}
