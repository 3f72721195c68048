//! Structured logging for transcribe-relay using the tracing crate.
//!
//! Hosted runtimes collect stderr, so that is the default sink. When a log
//! directory is configured, output goes to daily-rotated files there instead,
//! and old files are cleaned up, keeping only the 7 most recent days.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::rolling;
use tracing_subscriber::prelude::*;

use crate::config::LoggingConfig;

/// File name prefix of rotated log files.
pub const LOG_FILE_PREFIX: &str = "transcribe-relay.log";

/// Keep 7 days worth of logs.
const MAX_LOG_FILES: usize = 7;

/// Global non-blocking guard holder to keep the appender alive for the program lifetime.
static APPENDER_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Initializes the logging system.
///
/// Log level is controlled by the RUST_LOG environment variable (defaults to "info").
///
/// # Errors
/// - If the log directory cannot be created
/// - If logging was already initialized
pub fn init_logging(config: &LoggingConfig) -> Result<(), anyhow::Error> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match &config.directory {
        Some(log_dir) => {
            fs::create_dir_all(log_dir)?;

            if let Err(e) = cleanup_old_logs(log_dir) {
                eprintln!("Warning: Failed to cleanup old logs: {}", e);
            }

            let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            APPENDER_GUARD
                .set(guard)
                .map_err(|_| anyhow::anyhow!("Logging already initialized"))?;

            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true)
                        .with_ansi(false),
                )
                .try_init()?;

            tracing::debug!("Logging initialized. Log directory: {}", log_dir.display());
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_ansi(false),
                )
                .try_init()?;
        }
    }

    Ok(())
}

/// Rotated log files in `log_dir`, newest first.
///
/// # Errors
/// - If the log directory cannot be read
pub fn list_log_files(log_dir: &Path) -> Result<Vec<PathBuf>, anyhow::Error> {
    let prefix = format!("{LOG_FILE_PREFIX}.");
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            let file_name = path.file_name()?.to_string_lossy().to_string();

            // Only consider files matching transcribe-relay.log.YYYY-MM-DD
            if file_name.starts_with(&prefix) && file_name.matches('-').count() == 3 {
                let modified = fs::metadata(&path).ok()?.modified().ok()?;
                Some((path, modified))
            } else {
                None
            }
        })
        .collect();

    log_files.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(log_files.into_iter().map(|(path, _)| path).collect())
}

/// Cleans up old log files, keeping only the most recent days.
fn cleanup_old_logs(log_dir: &Path) -> Result<(), anyhow::Error> {
    for path in list_log_files(log_dir)?.iter().skip(MAX_LOG_FILES) {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("Failed to delete old log file {}: {}", path.display(), e);
        }
    }

    Ok(())
}
