//! Display recent log entries from the application.

use anyhow::anyhow;
use std::fs;

use crate::config::RelayConfig;
use crate::logging::list_log_files;

const DEFAULT_LINES: usize = 50;

/// Shows the tail of the most recent log file.
///
/// Only meaningful when `[logging].directory` is configured; otherwise logs go
/// to stderr and are collected by the host.
///
/// # Errors
/// - If the log directory cannot be read
/// - If the log file cannot be read
pub fn handle_logs(config: &RelayConfig, lines: Option<usize>) -> Result<(), anyhow::Error> {
    let Some(log_dir) = &config.logging.directory else {
        println!("File logging is not configured; logs are written to stderr.");
        println!("Set [logging] directory in the config file to keep log files.");
        return Ok(());
    };

    if !log_dir.exists() {
        println!("Log directory does not exist yet: {}", log_dir.display());
        println!("Logs will be created when the application runs.");
        return Ok(());
    }

    let Some(log_file) = list_log_files(log_dir)?.into_iter().next() else {
        println!("No log files found in: {}", log_dir.display());
        return Ok(());
    };

    let content = fs::read_to_string(&log_file)
        .map_err(|e| anyhow!("Failed to read log file: {e}"))?;

    if content.is_empty() {
        println!("Log file is empty: {}", log_file.display());
        return Ok(());
    }

    let wanted = lines.unwrap_or(DEFAULT_LINES);
    let lines: Vec<&str> = content.lines().collect();
    let start_index = lines.len().saturating_sub(wanted);

    if start_index > 0 {
        println!("Showing last {} of {} lines:", wanted, lines.len());
    } else {
        println!("Showing all {} lines:", lines.len());
    }
    println!("Full log file at: {}", log_file.display());
    println!();

    for line in &lines[start_index..] {
        println!("{line}");
    }

    Ok(())
}
