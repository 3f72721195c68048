//! Transcription job workflow building blocks.
//!
//! This module holds everything that talks to or reasons about the external
//! transcription service: the job model, the service port and its AWS
//! implementation, the status poller and the transcript fetcher. The request
//! handlers in [`crate::handler`] compose these pieces.

pub mod api;
pub mod fetcher;
pub mod job;
pub mod poller;
pub mod service;

pub use api::AwsTranscribe;
pub use fetcher::{parse_transcript_document, FetchError, HttpTranscriptFetcher, TranscriptFetcher};
pub use job::{generate_job_name, JobFeatures, JobSnapshot, JobStatus, OutputLocation, StartJobRequest};
pub use poller::{poll_until_terminal, Backoff, PollOutcome, PollPolicy};
pub use service::TranscriptionService;
