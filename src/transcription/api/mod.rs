//! Transcription service clients.
//!
//! Each client implements [`TranscriptionService`](super::TranscriptionService)
//! for one provider. AWS Transcribe is the only provider today.

mod aws;

pub use aws::AwsTranscribe;
