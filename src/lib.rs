//! transcribe-relay: request handlers around AWS Transcribe batch jobs.
//!
//! The transcribe handler submits a job for the requested audio, polls it with
//! capped exponential backoff and returns the transcript inline. The start
//! handler submits a job for configured audio and returns immediately. Both
//! can be hosted over HTTP or invoked once from the command line.

pub mod app;
pub mod commands;
pub mod config;
pub mod handler;
pub mod logging;
pub mod server;
pub mod transcription;
