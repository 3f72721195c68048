//! Fire-and-forget transcription: submit a job and acknowledge it.
//!
//! The audio source and output bucket come from the host's configuration, not
//! from the request. The service writes the result document to the bucket on
//! its own; nothing here waits for it.

use std::sync::Arc;

use crate::transcription::{JobSnapshot, OutputLocation, StartJobRequest, TranscriptionService};

use super::response::{started_response, HandlerResponse};
use super::transcribe::DEFAULT_LANGUAGE_CODE;
use super::{failure, run_isolated, HandlerError};

/// Host-supplied job settings. Media URI and output bucket are required at
/// invocation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartJobSettings {
    pub language_code: String,
    pub media_uri: Option<String>,
    pub output_bucket: Option<String>,
    pub output_key: Option<String>,
}

impl Default for StartJobSettings {
    fn default() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            media_uri: None,
            output_bucket: None,
            output_key: None,
        }
    }
}

impl StartJobSettings {
    fn to_request(&self) -> Result<StartJobRequest, HandlerError> {
        let media_uri = non_empty(&self.media_uri)
            .ok_or(HandlerError::NotConfigured("start_job.media_uri"))?;
        let bucket = non_empty(&self.output_bucket)
            .ok_or(HandlerError::NotConfigured("start_job.output_bucket"))?;

        Ok(
            StartJobRequest::new(media_uri, &self.language_code).with_output(OutputLocation {
                bucket: bucket.to_string(),
                key: non_empty(&self.output_key).map(str::to_string),
            }),
        )
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Starts a job for the configured audio and returns its name and status.
#[derive(Clone)]
pub struct StartJobHandler {
    service: Arc<dyn TranscriptionService>,
    settings: Arc<StartJobSettings>,
}

impl StartJobHandler {
    pub fn new(service: Arc<dyn TranscriptionService>, settings: StartJobSettings) -> Self {
        Self {
            service,
            settings: Arc::new(settings),
        }
    }

    /// Runs one invocation. The request payload is not consulted.
    pub async fn handle(&self) -> HandlerResponse {
        let this = self.clone();
        match run_isolated(async move { this.start().await }).await {
            Ok(snapshot) => {
                tracing::info!(
                    "Transcription job {} started with status {}",
                    snapshot.name,
                    snapshot.status
                );
                started_response(snapshot.name, snapshot.status.to_string())
            }
            Err(err) => failure(err),
        }
    }

    async fn start(&self) -> Result<JobSnapshot, HandlerError> {
        let request = self.settings.to_request()?;
        tracing::info!(
            "Starting transcription job {} for {}",
            request.job_name,
            request.media_uri
        );

        self.service
            .start_job(&request)
            .await
            .map_err(|e| HandlerError::Submission(format!("{e:#}")))
    }
}
