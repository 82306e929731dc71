use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Process-level configuration from the command line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the settings file and the release store
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join("settings.toml")
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("store.json")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("./data")
    }
}
