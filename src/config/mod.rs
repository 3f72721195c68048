//! Configuration management for transcribe-relay.
//!
//! Settings come from a TOML file in the user's config directory (or a path
//! given on the command line), with host-supplied environment variables taking
//! precedence for deployment-specific values such as buckets and URIs.

pub mod file;

pub use file::{
    default_config_path, ConfigError, FetchConfig, LoggingConfig, PollConfig, RelayConfig,
    ServerConfig, StartJobConfig, TranscribeConfig,
};
