//! Agent settings: an optional TOML file with environment and CLI overrides layered on top.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use scout_core::Policy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::APP_NAME;

/// Environment variable that replaces the configured log filter.
pub const LOG_ENV: &str = "SCOUT_LOG";

const SETTINGS_FILE_NAME: &str = "scout.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse settings {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Where episode journals go; `None` falls back to the platform data directory.
    pub journal_dir: Option<PathBuf>,
    pub log_filter: String,
    pub policy: Policy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 31415,
            journal_dir: None,
            log_filter: "info".to_string(),
            policy: Policy::default(),
        }
    }
}

impl Settings {
    pub fn get_default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME)
            .map(|proj_dirs| proj_dirs.config_dir().join(SETTINGS_FILE_NAME))
    }

    pub fn get_default_journal_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_dir().join("journals"))
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)
            .map_err(|source| SettingsError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| SettingsError::Parse { path: path.to_path_buf(), source })
    }

    /// An explicit path must exist; the default location is optional.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::get_default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// The filter to hand to the subscriber, preferring a non-empty `SCOUT_LOG` value.
    pub fn log_filter_with(&self, env_value: Option<&str>) -> String {
        match env_value.map(str::trim) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => self.log_filter.clone(),
        }
    }

    /// Journal file for an episode started at `started_at_unix_ms`, if any directory is known.
    pub fn journal_path(&self, started_at_unix_ms: u128) -> Option<PathBuf> {
        let dir = self.journal_dir.clone().or_else(Self::get_default_journal_dir)?;
        Some(dir.join(format!("episode-{started_at_unix_ms}.jsonl")))
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
