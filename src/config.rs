// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;
use crate::filter::DEFAULT_PARTIAL_SUFFIX;
use crate::http::DEFAULT_TIMEOUT;
use crate::indexer::DEFAULT_INDEXER_URL;
use crate::rpc::{DEFAULT_DAEMON_URL, DEFAULT_MAX_ATTEMPTS, RpcProtocol};
use crate::scheduler::DEFAULT_INTERVAL;
use crate::sync::{SubmissionStrategy, SyncOptions};

/// One tracked show
///
/// Accepts either a table (`{ query, folder, start_episode }`) or the short
/// positional form `[query, folder]` / `[query, folder, start_episode]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ShowEntry")]
pub struct ShowConfig {
    /// Indexer search string
    pub query: String,
    /// Destination folder, relative to the library root
    pub folder: PathBuf,
    /// 1-indexed position of the first episode to track
    pub start_episode: u32,
}

impl ShowConfig {
    pub fn new(query: impl Into<String>, folder: impl Into<PathBuf>) -> Self {
        Self {
            query: query.into(),
            folder: folder.into(),
            start_episode: 1,
        }
    }

    pub fn starting_at(mut self, start_episode: u32) -> Self {
        self.start_episode = start_episode;
        self
    }

    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        if self.query.trim().is_empty() {
            return Err(ConfigError::invalid(
                format!("shows[{index}].query"),
                "search query must not be empty",
            ));
        }

        if self.folder.as_os_str().is_empty() || !self.folder.is_relative() {
            return Err(ConfigError::invalid(
                format!("shows[{index}].folder"),
                format!(
                    "must be a non-empty path relative to root (got '{}')",
                    self.folder.display()
                ),
            ));
        }

        if self.start_episode == 0 {
            return Err(ConfigError::invalid(
                format!("shows[{index}].start_episode"),
                "episodes are numbered from 1",
            ));
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ShowEntry {
    Table {
        query: String,
        folder: PathBuf,
        #[serde(default = "default_start_episode")]
        start_episode: u32,
    },
    Full(String, PathBuf, u32),
    Short(String, PathBuf),
}

impl From<ShowEntry> for ShowConfig {
    fn from(entry: ShowEntry) -> Self {
        match entry {
            ShowEntry::Table {
                query,
                folder,
                start_episode,
            }
            | ShowEntry::Full(query, folder, start_episode) => {
                ShowConfig::new(query, folder).starting_at(start_episode)
            }
            ShowEntry::Short(query, folder) => ShowConfig::new(query, folder),
        }
    }
}

/// Library root plus the shows tracked under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub root: PathBuf,
    pub shows: Vec<ShowConfig>,
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory that show folders are resolved against
    pub root: PathBuf,

    #[serde(default = "default_indexer_url")]
    pub indexer_url: String,

    #[serde(default = "default_daemon_url")]
    pub daemon_url: String,

    #[serde(default)]
    pub rpc_protocol: RpcProtocol,

    /// Send torrent URLs or inline `.torrent` contents
    #[serde(default)]
    pub submission: SubmissionStrategy,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause after each submission
    #[serde(default = "default_submit_delay_secs")]
    pub submit_delay_secs: u64,

    /// Pause between cycles in periodic mode
    #[serde(default = "default_interval_hours")]
    pub interval_hours: u64,

    /// Bound on every HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extension of in-progress files
    #[serde(default = "default_partial_suffix")]
    pub partial_suffix: String,

    /// Keep going with the next episode when a submission fails
    #[serde(default = "default_true")]
    pub continue_on_error: bool,

    #[serde(default)]
    pub shows: Vec<ShowConfig>,
}

fn default_start_episode() -> u32 {
    1
}

fn default_indexer_url() -> String {
    DEFAULT_INDEXER_URL.to_string()
}

fn default_daemon_url() -> String {
    DEFAULT_DAEMON_URL.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_submit_delay_secs() -> u64 {
    1
}

fn default_interval_hours() -> u64 {
    DEFAULT_INTERVAL.as_secs() / 3600
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_partial_suffix() -> String {
    DEFAULT_PARTIAL_SUFFIX.to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load and validate a configuration file
    ///
    /// The format follows the extension: `.json` is JSON, `.yml` or `.yaml` is
    /// YAML, anything else is TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let config: Config = match extension.as_deref() {
            Some("json") => {
                serde_json::from_str(&contents).map_err(|e| ConfigError::JsonParseFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?
            }
            Some("yml" | "yaml") => {
                serde_yaml::from_str(&contents).map_err(|e| ConfigError::YamlParseFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?
            }
            _ => toml::from_str(&contents).map_err(|e| ConfigError::TomlParseFailed {
                path: path.to_path_buf(),
                source: e,
            })?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::invalid("root", "must not be empty"));
        }

        for (field, value) in [
            ("indexer_url", &self.indexer_url),
            ("daemon_url", &self.daemon_url),
        ] {
            Url::parse(value).map_err(|e| ConfigError::invalid(field, e.to_string()))?;
        }

        if self.max_attempts == 0 {
            return Err(ConfigError::invalid("max_attempts", "must be at least 1"));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be at least 1"));
        }

        if self.interval_hours == 0 {
            return Err(ConfigError::invalid("interval_hours", "must be at least 1"));
        }

        for (index, show) in self.shows.iter().enumerate() {
            show.validate(index)?;
        }

        Ok(())
    }

    pub fn library(&self) -> Library {
        Library {
            root: self.root.clone(),
            shows: self.shows.clone(),
        }
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions {
            strategy: self.submission,
            submit_delay: Duration::from_secs(self.submit_delay_secs),
            max_attempts: self.max_attempts,
            continue_on_error: self.continue_on_error,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_hours.saturating_mul(60 * 60))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
