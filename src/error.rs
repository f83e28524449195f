use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when talking to the torrent indexer
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("HTTP request failed for {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Indexer returned HTTP {status} for {url}")]
    Unavailable { url: String, status: u16 },

    #[error("Failed to parse feed from {url}: {source}")]
    InvalidFeed {
        url: String,
        #[source]
        source: rss::Error,
    },

    #[error("No file listing found on detail page {url}")]
    FileListMissing { url: String },

    #[error("Invalid indexer URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors that can occur when talking to the download daemon
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("RPC request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Daemon did not return a session id (HTTP {status})")]
    MissingSessionId { status: u16 },

    #[error("Session id was rejected by the daemon")]
    SessionExpired,

    #[error("Daemon returned HTTP {status}")]
    Status { status: u16 },

    #[error("Daemon rejected the request: {reason}")]
    Rejected { reason: String },

    #[error("Failed to encode RPC request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Submission to {download_dir} failed after {attempts} attempt(s): {source}")]
    SubmissionFailed {
        attempts: u32,
        download_dir: PathBuf,
        #[source]
        source: Box<SessionError>,
    },
}

/// Errors that can occur while loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse YAML config {path}: {source}")]
    YamlParseFailed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Errors that abort the synchronization of a single show
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to submit '{title}': {source}")]
    Submission {
        title: String,
        #[source]
        source: SessionError,
    },

    #[error("Failed to fetch torrent for '{title}': {source}")]
    Payload {
        title: String,
        #[source]
        source: IndexerError,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}
