use std::path::PathBuf;

use derive_more::From;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use metronome::{Configuration, TestConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use source::SourceSettings;
pub use stats::StatisticsConfig;

pub mod source;
pub mod stats;

const ENV_PREFIX: &str = "TAPLINE_";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Results are only saved for a configured profile
    pub profile: Option<String>,
    pub log_level: String,
    /// The test taken at start-up
    pub test: TestConfig,
    pub engine: Configuration,
    pub source: SourceSettings,
    pub statistic: StatisticsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: None,
            log_level: "info".to_string(),
            test: TestConfig::default(),
            engine: Configuration::default(),
            source: SourceSettings::default(),
            statistic: StatisticsConfig::default(),
        }
    }
}

impl Settings {
    /// The settings in the format of `settings.toml`
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[derive(Debug, From, Error)]
pub enum ConfigError {
    #[error(
        "Failed to get configuration directory. Please specify the location using the `--config <path>` flag"
    )]
    NoDirectory,

    #[error("Failed to create config directory: {0}")]
    CreateDirectory(std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(Box<figment::Error>),
}

#[derive(Debug)]
pub struct Config {
    pub settings: Settings,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn get(override_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let project_dirs = ProjectDirs::from("com", "Tapline", "Tapline");

        // Check for toml file location
        let config_dir = override_path
            .clone()
            .or_else(|| {
                project_dirs
                    .as_ref()
                    .map(|dirs| dirs.config_dir().to_path_buf())
            })
            .ok_or(ConfigError::NoDirectory)?;

        // Ensure path exists
        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir)?;
        }

        // Keep everything in one place when the location is overridden
        let data_dir = match (override_path, project_dirs) {
            (None, Some(dirs)) => dirs.data_dir().to_path_buf(),
            _ => config_dir.clone(),
        };

        let settings = Self::figment(&config_dir)
            .extract()
            .map_err(Box::new)?;

        Ok(Self {
            settings,
            config_dir,
            data_dir,
        })
    }

    /// Defaults, then `settings.toml`, then `TAPLINE_*` environment variables
    fn figment(config_dir: &std::path::Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_dir.join("settings.toml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Directory the results history is written to
    pub fn statistics_dir(&self) -> PathBuf {
        self.settings
            .statistic
            .directory
            .clone()
            .unwrap_or_else(|| self.data_dir.join("statistics"))
    }

    /// Returns true if results should be saved
    pub const fn is_authenticated(&self) -> bool {
        self.settings.profile.is_some() && self.settings.statistic.save_enabled
    }
}

#[cfg(test)]
mod tests {
    use metronome::{OverflowPolicy, TestMode};

    use super::*;

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::get(Some(dir.path().to_path_buf())).unwrap();

        assert_eq!(config.settings.test, TestConfig::default());
        assert_eq!(config.settings.engine.overflow, OverflowPolicy::Exclude);
        assert_eq!(config.settings.source, SourceSettings::default());
        assert!(!config.is_authenticated());
        assert_eq!(config.data_dir, dir.path());
        assert_eq!(config.statistics_dir(), dir.path().join("statistics"));
    }

    #[test]
    fn test_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("settings.toml"),
            r#"
profile = "ada"
log_level = "debug"

[test]
mode = "words"
count = 10
punctuation = true

[engine]
overflow = "reject"

[source]
kind = "command"
command = ["fortune", "-s"]
required_tools = ["fortune"]

[statistic]
history_limit = 3
"#,
        )
        .unwrap();

        let config = Config::get(Some(dir.path().to_path_buf())).unwrap();
        let settings = &config.settings;

        assert_eq!(settings.test.mode, TestMode::Words);
        assert_eq!(settings.test.count, 10);
        assert!(settings.test.punctuation);
        assert!(!settings.test.numbers);
        assert_eq!(settings.engine.overflow, OverflowPolicy::Reject);
        assert_eq!(
            settings.source,
            SourceSettings::Command {
                command: vec!["fortune".to_string(), "-s".to_string()],
                required_tools: vec!["fortune".to_string()],
            }
        );
        assert_eq!(settings.statistic.history_limit, 3);
        assert!(settings.statistic.save_enabled);
        assert_eq!(settings.log_level, "debug");
        assert!(config.is_authenticated());
    }

    #[test]
    fn test_dumped_settings_load() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            test: TestConfig {
                mode: TestMode::Words,
                count: 50,
                numbers: true,
                ..TestConfig::default()
            },
            profile: Some("ada".to_string()),
            ..Settings::default()
        };
        std::fs::write(dir.path().join("settings.toml"), settings.to_toml().unwrap()).unwrap();

        let config = Config::get(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(config.settings.test, settings.test);
        assert_eq!(config.settings.profile, settings.profile);
        assert_eq!(config.settings.source, settings.source);
    }

    #[test]
    fn test_invalid_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.toml"), "[test]\nmode = \"zen\"\n").unwrap();

        assert!(matches!(
            Config::get(Some(dir.path().to_path_buf())),
            Err(ConfigError::Parse(_))
        ));
    }
}
