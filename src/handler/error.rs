//! Failure kinds a handler invocation can end in.
//!
//! Every variant is converted into a 500 response by the formatter; none of
//! them ever reaches the host as a fault.

use thiserror::Error;

use crate::transcription::FetchError;

/// Problems with the inbound request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Request body is missing.")]
    MissingBody,
    #[error("Invalid JSON format in request body.")]
    MalformedBody(String),
    #[error("Missing audioFileUrl in request.")]
    MissingAudioUrl,
}

impl ValidationError {
    /// Extra detail for the caller, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ValidationError::MalformedBody(reason) => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The service refused to create the job.
    #[error("failed to start transcription job: {0}")]
    Submission(String),

    /// A status query failed while polling.
    #[error("failed to query transcription job status: {0}")]
    StatusQuery(String),

    /// The attempt budget ran out while the job was still running.
    #[error("transcription job {job_name} still {last_status} after {attempts} status checks")]
    PollTimeout {
        job_name: String,
        attempts: u32,
        last_status: String,
    },

    /// The service reported the job as failed.
    #[error("transcription job failed: {}", reason.as_deref().unwrap_or("no reason given"))]
    JobFailed { reason: Option<String> },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A required setting was not supplied by the host.
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl HandlerError {
    /// Caller-facing summary placed in the response `message`.
    pub fn message(&self) -> String {
        match self {
            HandlerError::Validation(e) => e.to_string(),
            HandlerError::JobFailed { .. } => "Transcription job failed.".to_string(),
            HandlerError::PollTimeout { .. } => "Transcription job timed out.".to_string(),
            HandlerError::NotConfigured(_) => {
                "Transcription start job is not configured.".to_string()
            }
            HandlerError::Submission(_)
            | HandlerError::StatusQuery(_)
            | HandlerError::Fetch(_)
            | HandlerError::Unexpected(_) => "Error processing transcription job.".to_string(),
        }
    }

    /// Detail placed in the response `error`; empty when there is none.
    pub fn detail(&self) -> String {
        match self {
            HandlerError::Validation(e) => e.detail().unwrap_or_default().to_string(),
            HandlerError::JobFailed { reason } => reason.clone().unwrap_or_default(),
            HandlerError::Submission(detail)
            | HandlerError::StatusQuery(detail)
            | HandlerError::Unexpected(detail) => detail.clone(),
            HandlerError::Fetch(e) => e.to_string(),
            HandlerError::PollTimeout { .. } | HandlerError::NotConfigured(_) => self.to_string(),
        }
    }
}
