//! Port for the external transcription service.
//!
//! The service owns the whole job lifecycle: this crate can start a job and
//! ask for its state, nothing else. Implementations are built once at startup
//! and shared between invocations.

use async_trait::async_trait;

use super::job::{JobSnapshot, StartJobRequest};

/// Start-job and get-job operations of an asynchronous transcription service.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Creates a job on the service. The job keeps running on the service
    /// side whatever happens to the caller afterwards.
    ///
    /// # Errors
    /// - If the service rejects the request (bad URI, permissions, quota)
    /// - If the service cannot be reached
    async fn start_job(&self, request: &StartJobRequest) -> anyhow::Result<JobSnapshot>;

    /// Reads the current state of a job.
    ///
    /// # Errors
    /// - If the service cannot be reached or does not know the job
    async fn get_job(&self, job_name: &str) -> anyhow::Result<JobSnapshot>;
}
