use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the text to type comes from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSettings {
    /// Random words from the built-in list, or from a list with one word per line
    Words {
        #[serde(default)]
        word_list: Option<PathBuf>,
    },
    /// The output of an external command
    ///
    /// Arguments may contain the placeholders `{mode}`, `{count}`, `{punctuation}` and
    /// `{numbers}`.
    Command {
        command: Vec<String>,
        #[serde(default)]
        required_tools: Vec<String>,
    },
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self::Words { word_list: None }
    }
}
