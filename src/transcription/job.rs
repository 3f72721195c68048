//! Transcription job model.
//!
//! Jobs are created by the transcription service and only observed here. A
//! [`JobSnapshot`] is what one status query returns; nothing is persisted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix shared by every generated job name.
const JOB_NAME_PREFIX: &str = "transcription-job";

/// Length of the random suffix appended after the timestamp.
const JOB_NAME_SUFFIX_LEN: usize = 8;

/// Status reported by the transcription service for a job.
///
/// Service values this crate does not know about are kept verbatim in
/// [`JobStatus::Other`] and treated like a job that is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
    Other(String),
}

impl JobStatus {
    /// Parses the wire value used by the service (`IN_PROGRESS`, `COMPLETED`, ...).
    pub fn from_service_str(value: &str) -> Self {
        match value {
            "QUEUED" => JobStatus::Queued,
            "IN_PROGRESS" => JobStatus::InProgress,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Other(value) => value,
        }
    }

    /// Whether the service will never move the job out of this status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the service should publish the result document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLocation {
    pub bucket: String,
    pub key: Option<String>,
}

/// Optional service features. `None` leaves the service default in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFeatures {
    pub show_speaker_labels: Option<bool>,
    pub channel_identification: Option<bool>,
}

impl JobFeatures {
    /// Speaker labels and channel identification both explicitly off.
    pub fn plain() -> Self {
        Self {
            show_speaker_labels: Some(false),
            channel_identification: Some(false),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.show_speaker_labels.is_none() && self.channel_identification.is_none()
    }
}

/// Everything needed to create a job on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartJobRequest {
    pub job_name: String,
    pub language_code: String,
    pub media_uri: String,
    pub features: JobFeatures,
    pub output: Option<OutputLocation>,
}

impl StartJobRequest {
    /// Builds a request with a freshly generated job name.
    pub fn new(media_uri: impl Into<String>, language_code: impl Into<String>) -> Self {
        Self {
            job_name: generate_job_name(),
            language_code: language_code.into(),
            media_uri: media_uri.into(),
            features: JobFeatures::default(),
            output: None,
        }
    }

    pub fn with_features(mut self, features: JobFeatures) -> Self {
        self.features = features;
        self
    }

    pub fn with_output(mut self, output: OutputLocation) -> Self {
        self.output = Some(output);
        self
    }
}

/// Observed state of a job at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub name: String,
    pub status: JobStatus,
    /// Present only when the job failed.
    pub failure_reason: Option<String>,
    /// Present only when the job completed.
    pub transcript_uri: Option<String>,
}

impl JobSnapshot {
    pub fn new(name: impl Into<String>, status: JobStatus) -> Self {
        Self {
            name: name.into(),
            status,
            failure_reason: None,
            transcript_uri: None,
        }
    }
}

/// Generates a job name from the current time plus a random suffix.
///
/// The timestamp keeps names sortable in the service console; the suffix keeps
/// two jobs started in the same millisecond apart.
pub fn generate_job_name() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{JOB_NAME_PREFIX}-{millis}-{}",
        &suffix[..JOB_NAME_SUFFIX_LEN]
    )
}
