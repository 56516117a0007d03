//! Configuration loading and management
//!
//! Handles parsing of `.chat-tasks.toml` configuration files.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::classify::DEFAULT_MARKER;
use crate::enrich::ThreadMode;
use crate::retry::{DEFAULT_ATTEMPTS, DEFAULT_DELAY_SECS};

/// Name of the per-directory configuration file
pub const CONFIG_FILE: &str = ".chat-tasks.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Task-bot message recognition
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Retry policy for message source calls
    #[serde(default)]
    pub retry: RetryConfig,

    /// Message source configuration
    #[serde(default)]
    pub source: SourceConfig,

    /// People and space allow-lists
    #[serde(default)]
    pub filter: FilterConfig,

    /// Report defaults
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Substring that marks task-bot messages
    #[serde(default = "default_marker")]
    pub marker: String,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Attempts per external call
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
}

fn default_attempts() -> u32 {
    DEFAULT_ATTEMPTS
}

fn default_delay_secs() -> u64 {
    DEFAULT_DELAY_SECS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay_secs: default_delay_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Message archive directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<PathBuf>,

    /// Messages served per page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    100
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            archive: None,
            page_size: default_page_size(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    /// Assignees to keep (case-insensitive); empty keeps everyone
    #[serde(default)]
    pub people: Vec<String>,

    /// Space resource names to keep; empty keeps every space
    #[serde(default)]
    pub spaces: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Thread context collected for `tasks`
    #[serde(default = "default_thread_mode")]
    pub thread_mode: ThreadMode,
}

fn default_thread_mode() -> ThreadMode {
    ThreadMode::Context
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            thread_mode: default_thread_mode(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `.chat-tasks.toml` from `dir`, then the user config file, or
    /// return defaults.
    pub fn load_from_dir(dir: &Path) -> crate::error::Result<Self> {
        let local = dir.join(CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }
        if let Some(user) = user_config_path() {
            if user.exists() {
                return Self::load(&user);
            }
        }
        Ok(Self::default())
    }

    /// Resolve configuration for the CLI: explicit path wins.
    pub fn resolve(explicit: Option<&Path>) -> crate::error::Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                Self::load_from_dir(&cwd)
            }
        }
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.classifier.marker.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "classifier.marker cannot be empty".to_string(),
            ));
        }
        if self.retry.attempts == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "retry.attempts must be >= 1".to_string(),
            ));
        }
        if self.source.page_size == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "source.page_size must be > 0".to_string(),
            ));
        }
        for space in &self.filter.spaces {
            if !space.starts_with("spaces/") {
                return Err(crate::error::Error::InvalidConfig(format!(
                    "filter.spaces entry '{space}' must be a space resource name (spaces/...)"
                )));
            }
        }
        Ok(())
    }
}

/// Per-user configuration file, e.g. `~/.config/chat-tasks/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "chat-tasks")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
