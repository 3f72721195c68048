//! Synchronous transcription: submit, poll, fetch, respond.

use std::sync::Arc;

use crate::transcription::{
    poll_until_terminal, FetchError, JobFeatures, PollOutcome, PollPolicy, StartJobRequest,
    TranscriptFetcher, TranscriptionService,
};

use super::request::{parse_transcribe_request, InvocationEvent};
use super::response::{success_response, HandlerResponse, TRANSCRIPTION_COMPLETED};
use super::{failure, run_isolated, HandlerError};

/// Language used when none is configured.
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// Per-deployment settings of the transcribe handler.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscribeSettings {
    pub language_code: String,
    pub poll: PollPolicy,
}

impl Default for TranscribeSettings {
    fn default() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE_CODE.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

/// Handles "transcribe this audio" requests end to end.
///
/// The service and fetcher are shared clients built at startup; cloning the
/// handler only bumps reference counts.
#[derive(Clone)]
pub struct TranscribeHandler {
    service: Arc<dyn TranscriptionService>,
    fetcher: Arc<dyn TranscriptFetcher>,
    settings: Arc<TranscribeSettings>,
}

impl TranscribeHandler {
    pub fn new(
        service: Arc<dyn TranscriptionService>,
        fetcher: Arc<dyn TranscriptFetcher>,
        settings: TranscribeSettings,
    ) -> Self {
        Self {
            service,
            fetcher,
            settings: Arc::new(settings),
        }
    }

    /// Runs one invocation. Never fails: every outcome is a formatted response.
    pub async fn handle(&self, event: InvocationEvent) -> HandlerResponse {
        tracing::debug!("Received event: {:?}", event);

        let this = self.clone();
        match run_isolated(async move { this.transcribe(&event).await }).await {
            Ok(transcript) => {
                tracing::info!("Transcription returned: {} chars", transcript.len());
                success_response(TRANSCRIPTION_COMPLETED, transcript)
            }
            Err(err) => failure(err),
        }
    }

    async fn transcribe(&self, event: &InvocationEvent) -> Result<String, HandlerError> {
        let request = parse_transcribe_request(event)?;

        let job = StartJobRequest::new(request.audio_file_url, &self.settings.language_code)
            .with_features(JobFeatures::plain());
        tracing::info!("Starting transcription job with name: {}", job.job_name);

        self.service
            .start_job(&job)
            .await
            .map_err(|e| HandlerError::Submission(format!("{e:#}")))?;

        let outcome = poll_until_terminal(self.service.as_ref(), &job.job_name, &self.settings.poll)
            .await
            .map_err(|e| HandlerError::StatusQuery(format!("{e:#}")))?;

        match outcome {
            PollOutcome::Completed(snapshot) => {
                tracing::info!("Transcription job {} completed", snapshot.name);
                let uri = snapshot.transcript_uri.ok_or(FetchError::MissingUri)?;
                Ok(self.fetcher.fetch(&uri).await?)
            }
            PollOutcome::Failed(snapshot) => Err(HandlerError::JobFailed {
                reason: snapshot.failure_reason,
            }),
            PollOutcome::TimedOut {
                attempts,
                last_status,
            } => Err(HandlerError::PollTimeout {
                job_name: job.job_name,
                attempts,
                last_status: last_status.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{JobSnapshot, JobStatus};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        started: Mutex<Vec<StartJobRequest>>,
        reject_start: bool,
        final_status: Option<JobStatus>,
        queries: Mutex<u32>,
    }

    #[async_trait]
    impl TranscriptionService for RecordingService {
        async fn start_job(&self, request: &StartJobRequest) -> anyhow::Result<JobSnapshot> {
            if self.reject_start {
                anyhow::bail!("BadRequestException: invalid media URI");
            }
            self.started.lock().unwrap().push(request.clone());
            Ok(JobSnapshot::new(&request.job_name, JobStatus::InProgress))
        }

        async fn get_job(&self, job_name: &str) -> anyhow::Result<JobSnapshot> {
            assert!(
                !self.started.lock().unwrap().is_empty(),
                "polled before submission"
            );
            *self.queries.lock().unwrap() += 1;
            let status = self.final_status.clone().unwrap_or(JobStatus::InProgress);
            let mut snapshot = JobSnapshot::new(job_name, status);
            if snapshot.status == JobStatus::Failed {
                snapshot.failure_reason = Some("The media format is not supported".to_string());
            }
            Ok(snapshot)
        }
    }

    struct UnusedFetcher;

    #[async_trait]
    impl TranscriptFetcher for UnusedFetcher {
        async fn fetch(&self, _uri: &str) -> Result<String, FetchError> {
            panic!("fetch should not be reached");
        }
    }

    fn handler(service: Arc<RecordingService>) -> TranscribeHandler {
        TranscribeHandler::new(service, Arc::new(UnusedFetcher), TranscribeSettings::default())
    }

    #[tokio::test]
    async fn test_invalid_body_never_submits() {
        let service = Arc::new(RecordingService::default());
        let handler = handler(service.clone());

        for event in [
            InvocationEvent::default(),
            InvocationEvent::from_raw_body("not json"),
            InvocationEvent::from_json(json!({"audio": "s3://bucket/a.mp3"})),
        ] {
            let response = handler.handle(event).await;
            assert_eq!(response.status_code, 500);
        }
        assert!(service.started.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submission_uses_language_and_disables_features() {
        let service = Arc::new(RecordingService {
            final_status: Some(JobStatus::Failed),
            ..RecordingService::default()
        });
        let handler = handler(service.clone());

        handler
            .handle(InvocationEvent::from_json(json!({"audioFileUrl": "s3://bucket/a.mp3"})))
            .await;

        let started = service.started.lock().unwrap();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].media_uri, "s3://bucket/a.mp3");
        assert_eq!(started[0].language_code, "en-US");
        assert_eq!(started[0].features, JobFeatures::plain());
        assert_eq!(started[0].output, None);
    }

    #[tokio::test]
    async fn test_rejected_submission_is_reported() {
        let service = Arc::new(RecordingService {
            reject_start: true,
            ..RecordingService::default()
        });

        let response = handler(service.clone())
            .handle(InvocationEvent::from_json(json!({"audioFileUrl": "ftp://nope"})))
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.message, "Error processing transcription job.");
        assert!(response
            .body
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("invalid media URI"));
        assert_eq!(*service.queries.lock().unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_job_reports_reason_after_one_query() {
        let service = Arc::new(RecordingService {
            final_status: Some(JobStatus::Failed),
            ..RecordingService::default()
        });

        let response = handler(service.clone())
            .handle(InvocationEvent::from_json(json!({"audioFileUrl": "s3://bucket/a.mp3"})))
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.message, "Transcription job failed.");
        assert_eq!(
            response.body.error.as_deref(),
            Some("The media format is not supported")
        );
        assert_eq!(*service.queries.lock().unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_that_never_finishes_times_out() {
        let service = Arc::new(RecordingService::default());

        let response = handler(service.clone())
            .handle(InvocationEvent::from_json(json!({"audioFileUrl": "s3://bucket/a.mp3"})))
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body.message, "Transcription job timed out.");
        assert_eq!(*service.queries.lock().unwrap(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completed_without_uri_is_fetch_error() {
        let service = Arc::new(RecordingService {
            final_status: Some(JobStatus::Completed),
            ..RecordingService::default()
        });

        let response = handler(service)
            .handle(InvocationEvent::from_json(json!({"audioFileUrl": "s3://bucket/a.mp3"})))
            .await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body.error.as_deref(),
            Some("Transcription job completed without a transcript URI")
        );
    }
}
