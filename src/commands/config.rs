//! Show the effective configuration.
//!
//! Prints the settings after file loading and environment overrides, so a
//! deployment can check what the handlers will actually use.

use std::path::Path;

use crate::config::{default_config_path, RelayConfig};

/// Prints the resolved configuration as TOML.
///
/// # Errors
/// - If the configuration cannot be serialized
pub fn handle_config(config: &RelayConfig, config_path: Option<&Path>) -> anyhow::Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    match path {
        Some(path) if path.exists() => println!("# Config file: {}", path.display()),
        Some(path) => println!("# Config file: {} (not found, using defaults)", path.display()),
        None => println!("# Config file: none (using defaults)"),
    }
    println!("# Environment overrides are already applied.");
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
