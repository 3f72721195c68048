//! Retrieval of the transcript result document.
//!
//! When a job completes the service publishes a JSON document shaped like
//! `{"results": {"transcripts": [{"transcript": "..."}]}}` at an HTTPS URI.
//! The fetcher downloads it within a single timeout and extracts the first
//! transcript.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Default time allowed for the whole download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_millis(5000);

/// Why the transcript could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Failed to fetch transcript: {0}")]
    Network(String),
    #[error("Transcript request timed out after {0} ms")]
    TimedOut(u128),
    #[error("Transcript request returned HTTP {0}")]
    Status(u16),
    #[error("Failed to parse transcript JSON: {0}")]
    Malformed(String),
    #[error("Transcript document contains no transcripts")]
    MissingTranscript,
    #[error("Transcription job completed without a transcript URI")]
    MissingUri,
}

/// Downloads and parses a result document.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Deserialize)]
struct ResultDocument {
    results: ResultSection,
}

#[derive(Debug, Deserialize)]
struct ResultSection {
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Extracts `results.transcripts[0].transcript` from a result document.
///
/// # Errors
/// - [`FetchError::Malformed`] if the body is not JSON or lacks the expected fields
/// - [`FetchError::MissingTranscript`] if the transcripts list is empty
pub fn parse_transcript_document(body: &[u8]) -> Result<String, FetchError> {
    let document: ResultDocument =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    document
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or(FetchError::MissingTranscript)
}

/// [`TranscriptFetcher`] that issues a plain HTTP GET with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTranscriptFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTranscriptFetcher {
    /// Builds a fetcher with its own connection pool.
    ///
    /// # Errors
    /// - If the HTTP client cannot be created (TLS backend initialisation)
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn classify(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::TimedOut(self.timeout.as_millis())
        } else if error.is_connect() {
            FetchError::Network("could not connect to transcript host".to_string())
        } else {
            FetchError::Network(error.to_string())
        }
    }
}

#[async_trait]
impl TranscriptFetcher for HttpTranscriptFetcher {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        tracing::debug!("Fetching transcript document (timeout {:?})", self.timeout);

        // Dropping the future on timeout aborts the in-flight request.
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        tracing::debug!("Transcript document received: {} bytes", body.len());

        parse_transcript_document(&body)
    }
}
