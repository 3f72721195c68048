//! Configuration file management for transcribe-relay.
//!
//! Settings are read from a TOML file, then selected values are overridden by
//! environment variables supplied by the host. A missing file is not an
//! error: every setting has a default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::handler::{StartJobSettings, TranscribeSettings};
use crate::transcription::poller::{
    DEFAULT_BACKOFF_FACTOR, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY,
};
use crate::transcription::{fetcher::DEFAULT_FETCH_TIMEOUT, PollPolicy};

/// Environment variables that override file settings.
pub const ENV_LANGUAGE_CODE: &str = "TRANSCRIBE_RELAY_LANGUAGE_CODE";
pub const ENV_MEDIA_URI: &str = "TRANSCRIBE_RELAY_MEDIA_URI";
pub const ENV_OUTPUT_BUCKET: &str = "TRANSCRIBE_RELAY_OUTPUT_BUCKET";
pub const ENV_OUTPUT_KEY: &str = "TRANSCRIBE_RELAY_OUTPUT_KEY";
pub const ENV_BIND: &str = "TRANSCRIBE_RELAY_BIND";

/// Accepted range for `poll.backoff_factor`.
const MIN_BACKOFF_FACTOR: f64 = 1.0;
const MAX_BACKOFF_FACTOR: f64 = 10.0;

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid setting {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Transcription service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscribeConfig {
    /// Language of the audio (BCP-47, e.g. "en-US")
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// AWS region; the standard provider chain is used when unset
    #[serde(default)]
    pub region: Option<String>,
}

fn default_language_code() -> String {
    crate::handler::transcribe::DEFAULT_LANGUAGE_CODE.to_string()
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            language_code: default_language_code(),
            region: None,
        }
    }
}

/// Status polling settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollConfig {
    /// Maximum number of status queries per job
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Wait before the first status query, in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Upper bound for the wait between queries, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Growth applied to the wait after every attempt
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Also wait while each status query is in flight (two delays per attempt)
    #[serde(default)]
    pub settle_wait: bool,
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_initial_delay_ms() -> u64 {
    DEFAULT_INITIAL_DELAY.as_millis() as u64
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY.as_millis() as u64
}

fn default_backoff_factor() -> f64 {
    DEFAULT_BACKOFF_FACTOR
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_factor: default_backoff_factor(),
            settle_wait: false,
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_factor: self.backoff_factor,
            settle_wait: self.settle_wait,
        }
    }
}

/// Transcript download settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Time allowed for the whole transcript download, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_fetch_timeout_ms() -> u64 {
    DEFAULT_FETCH_TIMEOUT.as_millis() as u64
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Fire-and-forget job target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartJobConfig {
    /// Audio to transcribe (e.g. "s3://bucket/audio.mp3")
    #[serde(default)]
    pub media_uri: Option<String>,
    /// Bucket the service writes the result document to
    #[serde(default)]
    pub output_bucket: Option<String>,
    /// Optional key or prefix inside the output bucket
    #[serde(default)]
    pub output_key: Option<String>,
}

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the server listens on
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write daily-rotated log files here instead of stderr
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub transcribe: TranscribeConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub start_job: StartJobConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Loads configuration from `path`, or from the default location when `None`.
    ///
    /// Environment overrides are applied after the file is read, then the
    /// result is validated.
    ///
    /// # Errors
    /// - If the file exists but cannot be read
    /// - If the TOML is malformed
    /// - If a setting is out of range
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies host-supplied overrides. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(language_code) = get(ENV_LANGUAGE_CODE) {
            self.transcribe.language_code = language_code;
        }
        if let Some(media_uri) = get(ENV_MEDIA_URI) {
            self.start_job.media_uri = Some(media_uri);
        }
        if let Some(bucket) = get(ENV_OUTPUT_BUCKET) {
            self.start_job.output_bucket = Some(bucket);
        }
        if let Some(key) = get(ENV_OUTPUT_KEY) {
            self.start_job.output_key = Some(key);
        }
        if let Some(bind) = get(ENV_BIND) {
            self.server.bind = bind;
        }
    }

    /// Checks that polling and fetching settings describe a bounded wait.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &'static str| -> Result<(), ConfigError> {
            Err(ConfigError::Invalid { field, reason })
        };

        if self.transcribe.language_code.trim().is_empty() {
            return invalid("transcribe.language_code", "must not be empty");
        }
        if self.poll.max_attempts == 0 {
            return invalid("poll.max_attempts", "must be at least 1");
        }
        if self.poll.initial_delay_ms == 0 {
            return invalid("poll.initial_delay_ms", "must be greater than 0");
        }
        if self.poll.max_delay_ms < self.poll.initial_delay_ms {
            return invalid("poll.max_delay_ms", "must not be below poll.initial_delay_ms");
        }
        if !(MIN_BACKOFF_FACTOR..=MAX_BACKOFF_FACTOR).contains(&self.poll.backoff_factor) {
            return invalid("poll.backoff_factor", "must be between 1.0 and 10.0");
        }
        if self.fetch.timeout_ms == 0 {
            return invalid("fetch.timeout_ms", "must be greater than 0");
        }
        Ok(())
    }

    pub fn transcribe_settings(&self) -> TranscribeSettings {
        TranscribeSettings {
            language_code: self.transcribe.language_code.clone(),
            poll: self.poll.policy(),
        }
    }

    pub fn start_job_settings(&self) -> StartJobSettings {
        StartJobSettings {
            language_code: self.transcribe.language_code.clone(),
            media_uri: self.start_job.media_uri.clone(),
            output_bucket: self.start_job.output_bucket.clone(),
            output_key: self.start_job.output_key.clone(),
        }
    }
}

/// Default config file location: `<config dir>/transcribe-relay/relay.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("transcribe-relay").join("relay.toml"))
}
