//! AWS Transcribe implementation of [`TranscriptionService`].
//!
//! Uses the batch job API: `StartTranscriptionJob` to create the job and
//! `GetTranscriptionJob` to observe it. Credentials and region come from the
//! standard AWS provider chain unless a region is configured explicitly.

use anyhow::anyhow;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_transcribe as transcribe;
use aws_sdk_transcribe::config::Region;
use aws_sdk_transcribe::error::DisplayErrorContext;

use crate::transcription::job::{JobSnapshot, JobStatus, StartJobRequest};
use crate::transcription::service::TranscriptionService;

/// Transcription service client backed by AWS Transcribe.
#[derive(Debug, Clone)]
pub struct AwsTranscribe {
    client: transcribe::Client,
}

impl AwsTranscribe {
    /// Wraps an already configured SDK client.
    pub fn new(client: transcribe::Client) -> Self {
        Self { client }
    }

    /// Loads AWS configuration from the environment and builds the client.
    ///
    /// `region` takes precedence over the provider chain when set.
    pub async fn from_env(region: Option<&str>) -> Self {
        let region_provider =
            RegionProviderChain::first_try(region.map(|r| Region::new(r.to_string())))
                .or_default_provider();
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        tracing::debug!(
            "AWS Transcribe client configured for region {}",
            config
                .region()
                .map(|r| r.as_ref())
                .unwrap_or("<unresolved>")
        );

        Self::new(transcribe::Client::new(&config))
    }
}

#[async_trait]
impl TranscriptionService for AwsTranscribe {
    async fn start_job(&self, request: &StartJobRequest) -> anyhow::Result<JobSnapshot> {
        let media = transcribe::types::Media::builder()
            .media_file_uri(&request.media_uri)
            .build();

        let mut call = self
            .client
            .start_transcription_job()
            .transcription_job_name(&request.job_name)
            .language_code(transcribe::types::LanguageCode::from(
                request.language_code.as_str(),
            ))
            .media(media);

        if !request.features.is_empty() {
            let settings = transcribe::types::Settings::builder()
                .set_show_speaker_labels(request.features.show_speaker_labels)
                .set_channel_identification(request.features.channel_identification)
                .build();
            call = call.settings(settings);
        }

        if let Some(output) = &request.output {
            call = call
                .output_bucket_name(&output.bucket)
                .set_output_key(output.key.clone());
        }

        tracing::debug!(
            "StartTranscriptionJob: name={}, language={}, media={}, output={:?}",
            request.job_name,
            request.language_code,
            request.media_uri,
            request.output
        );

        let response = call.send().await.map_err(|e| {
            anyhow!(
                "AWS Transcribe rejected job {}: {}",
                request.job_name,
                DisplayErrorContext(&e)
            )
        })?;

        // The service echoes the job back; fall back to the name we sent.
        Ok(response
            .transcription_job()
            .map(|job| to_snapshot(job, &request.job_name))
            .unwrap_or_else(|| JobSnapshot::new(&request.job_name, JobStatus::InProgress)))
    }

    async fn get_job(&self, job_name: &str) -> anyhow::Result<JobSnapshot> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(job_name)
            .send()
            .await
            .map_err(|e| {
                anyhow!(
                    "Failed to query AWS Transcribe job {job_name}: {}",
                    DisplayErrorContext(&e)
                )
            })?;

        let job = response
            .transcription_job()
            .ok_or_else(|| anyhow!("AWS Transcribe returned no job for {job_name}"))?;

        Ok(to_snapshot(job, job_name))
    }
}

fn to_snapshot(job: &transcribe::types::TranscriptionJob, fallback_name: &str) -> JobSnapshot {
    let status = job
        .transcription_job_status()
        .map(|s| JobStatus::from_service_str(s.as_str()))
        .unwrap_or_else(|| JobStatus::Other("UNKNOWN".to_string()));

    JobSnapshot {
        name: job
            .transcription_job_name()
            .unwrap_or(fallback_name)
            .to_string(),
        status,
        failure_reason: job.failure_reason().map(str::to_string),
        transcript_uri: job
            .transcript()
            .and_then(|t| t.transcript_file_uri())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_of_completed_job_carries_transcript_uri() {
        let job = transcribe::types::TranscriptionJob::builder()
            .transcription_job_name("transcription-job-1")
            .transcription_job_status(transcribe::types::TranscriptionJobStatus::Completed)
            .transcript(
                transcribe::types::Transcript::builder()
                    .transcript_file_uri("https://x/out.json")
                    .build(),
            )
            .build();

        let snapshot = to_snapshot(&job, "ignored");
        assert_eq!(snapshot.name, "transcription-job-1");
        assert_eq!(snapshot.status, JobStatus::Completed);
        assert_eq!(snapshot.transcript_uri.as_deref(), Some("https://x/out.json"));
        assert_eq!(snapshot.failure_reason, None);
    }

    #[test]
    fn test_snapshot_of_failed_job_carries_reason() {
        let job = transcribe::types::TranscriptionJob::builder()
            .transcription_job_status(transcribe::types::TranscriptionJobStatus::Failed)
            .failure_reason("Unsupported media format")
            .build();

        let snapshot = to_snapshot(&job, "transcription-job-2");
        assert_eq!(snapshot.name, "transcription-job-2");
        assert_eq!(snapshot.status, JobStatus::Failed);
        assert_eq!(
            snapshot.failure_reason.as_deref(),
            Some("Unsupported media format")
        );
    }

    #[test]
    fn test_snapshot_without_status_keeps_polling_semantics() {
        let job = transcribe::types::TranscriptionJob::builder().build();
        let snapshot = to_snapshot(&job, "transcription-job-3");
        assert!(!snapshot.status.is_terminal());
    }
}
