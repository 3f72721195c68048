//! Application command handlers for transcribe-relay.
//!
//! # Commands
//! - `serve`: HTTP host for both handlers
//! - `invoke`: run the transcribe handler once on an event document
//! - `start`: run the start-job handler once
//! - `config`: print the effective configuration
//! - `logs`: display recent log entries

pub mod config;
pub mod invoke;
pub mod logs;
pub mod serve;
pub mod start;

pub use config::handle_config;
pub use invoke::handle_invoke;
pub use logs::handle_logs;
pub use serve::handle_serve;
pub use start::handle_start;
